//! Change generators.
//!
//! Generators are registered per concern (missing, unexpected, changed)
//! and declare which object types they handle through
//! [`ChangeGenerator::priority`]. For one object, the generators of its
//! type form a chain ordered by priority; the first generator that returns
//! `Some` ends the chain. `None` means "nothing for me here".

mod column;
mod sequence;
mod table;

use std::collections::{BTreeMap, BTreeSet};

pub use column::{
    ChangedColumnChangeGenerator, MissingColumnChangeGenerator, UnexpectedColumnChangeGenerator,
};
pub use sequence::{
    ChangedSequenceChangeGenerator, MissingSequenceChangeGenerator,
    UnexpectedSequenceChangeGenerator,
};
pub use table::{MissingTableChangeGenerator, UnexpectedTableChangeGenerator};

use crate::dialect::Database;
use crate::error::{Result, TidemarkError};
use crate::snapshot::DatabaseSnapshot;
use crate::structure::{ObjectType, ObjectView};

use super::{Change, DiffOutputControl, ObjectDifferences};

/// Priority of the stock generators.
pub const PRIORITY_DEFAULT: i32 = 1;

/// Priority of a database-specific generator overriding the stock one.
pub const PRIORITY_DATABASE: i32 = 5;

/// Everything a generator may consult besides the object itself.
#[derive(Clone, Copy)]
pub struct GeneratorContext<'a> {
    /// Qualifier policy for generated changes.
    pub control: DiffOutputControl,
    /// Dialect of the reference snapshot.
    pub reference_database: &'a dyn Database,
    /// Dialect of the comparison snapshot.
    pub comparison_database: &'a dyn Database,
    /// The snapshot describing the desired state.
    pub reference: &'a DatabaseSnapshot,
    /// The snapshot describing the current state.
    pub comparison: &'a DatabaseSnapshot,
}

impl<'a> GeneratorContext<'a> {
    /// Creates a context with the default output control.
    #[must_use]
    pub fn new(
        reference: &'a DatabaseSnapshot,
        comparison: &'a DatabaseSnapshot,
        reference_database: &'a dyn Database,
        comparison_database: &'a dyn Database,
    ) -> Self {
        Self {
            control: DiffOutputControl::default(),
            reference_database,
            comparison_database,
            reference,
            comparison,
        }
    }

    /// Sets the output control.
    #[must_use]
    pub fn control(mut self, control: DiffOutputControl) -> Self {
        self.control = control;
        self
    }

    /// Returns true if an object with the same type and catalog-relative
    /// name exists in the comparison snapshot.
    #[must_use]
    pub fn in_comparison(&self, view: &ObjectView<'_>) -> bool {
        exists(self.comparison, view)
    }

    /// Returns true if an object with the same type and catalog-relative
    /// name exists in the reference snapshot.
    #[must_use]
    pub fn in_reference(&self, view: &ObjectView<'_>) -> bool {
        exists(self.reference, view)
    }
}

fn exists(snapshot: &DatabaseSnapshot, view: &ObjectView<'_>) -> bool {
    let reference = view.relative_reference();
    snapshot
        .of_type(view.object_type())
        .iter()
        .any(|other| other.relative_reference() == reference)
}

/// Ordering and priority shared by every generator.
pub trait ChangeGenerator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Priority for `object_type`, or `None` if the type is not handled.
    fn priority(&self, object_type: ObjectType) -> Option<i32>;

    /// Types whose generators must run after this generator's types.
    fn run_before_types(&self) -> &'static [ObjectType] {
        &[]
    }

    /// Types whose generators must run before this generator's types.
    fn run_after_types(&self) -> &'static [ObjectType] {
        &[]
    }
}

/// Produces changes for an object only present in the reference snapshot.
pub trait MissingObjectChangeGenerator: ChangeGenerator {
    /// Returns the changes that create `missing`.
    fn fix_missing(
        &self,
        missing: &ObjectView<'_>,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>>;
}

/// Produces changes for an object only present in the comparison snapshot.
pub trait UnexpectedObjectChangeGenerator: ChangeGenerator {
    /// Returns the changes that remove `unexpected`.
    fn fix_unexpected(
        &self,
        unexpected: &ObjectView<'_>,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>>;
}

/// Produces changes for an object present in both snapshots.
pub trait ChangedObjectChangeGenerator: ChangeGenerator {
    /// Returns the changes that bring the comparison object in line with
    /// `changed`, the reference object.
    fn fix_changed(
        &self,
        changed: &ObjectView<'_>,
        differences: &ObjectDifferences,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>>;
}

/// Every generator known at startup.
#[derive(Default)]
pub struct GeneratorRegistry {
    pub(crate) missing: Vec<Box<dyn MissingObjectChangeGenerator>>,
    pub(crate) unexpected: Vec<Box<dyn UnexpectedObjectChangeGenerator>>,
    pub(crate) changed: Vec<Box<dyn ChangedObjectChangeGenerator>>,
}

impl GeneratorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the stock generators.
    #[must_use]
    pub fn with_core_generators() -> Self {
        let mut registry = Self::new();
        registry
            .register_missing(MissingSequenceChangeGenerator)
            .register_missing(MissingTableChangeGenerator)
            .register_missing(MissingColumnChangeGenerator)
            .register_unexpected(UnexpectedSequenceChangeGenerator)
            .register_unexpected(UnexpectedTableChangeGenerator)
            .register_unexpected(UnexpectedColumnChangeGenerator)
            .register_changed(ChangedSequenceChangeGenerator)
            .register_changed(ChangedColumnChangeGenerator);
        registry
    }

    /// Registers a generator for missing objects.
    pub fn register_missing(
        &mut self,
        generator: impl MissingObjectChangeGenerator + 'static,
    ) -> &mut Self {
        self.missing.push(Box::new(generator));
        self
    }

    /// Registers a generator for unexpected objects.
    pub fn register_unexpected(
        &mut self,
        generator: impl UnexpectedObjectChangeGenerator + 'static,
    ) -> &mut Self {
        self.unexpected.push(Box::new(generator));
        self
    }

    /// Registers a generator for changed objects.
    pub fn register_changed(
        &mut self,
        generator: impl ChangedObjectChangeGenerator + 'static,
    ) -> &mut Self {
        self.changed.push(Box::new(generator));
        self
    }
}

/// Generators handling `object_type`, highest priority first. Equal
/// priorities keep registration order.
pub(crate) fn chain<G: ChangeGenerator + ?Sized>(
    generators: &[Box<G>],
    object_type: ObjectType,
) -> Vec<&G> {
    let mut chain: Vec<(i32, &G)> = generators
        .iter()
        .filter_map(|g| g.priority(object_type).map(|p| (p, &**g)))
        .collect();
    chain.sort_by(|a, b| b.0.cmp(&a.0));
    chain.into_iter().map(|(_, g)| g).collect()
}

/// Computes the order in which object types are visited.
///
/// The order honors every before/after constraint. Among types that are
/// free to go next, the one whose best generator has the highest priority
/// goes first. Contradictory constraints fail with `OrderingConflict`.
pub(crate) fn type_order<G: ChangeGenerator + ?Sized>(
    generators: &[Box<G>],
) -> Result<Vec<ObjectType>> {
    let mut priority: BTreeMap<ObjectType, i32> = BTreeMap::new();
    for generator in generators {
        for object_type in ObjectType::ALL {
            if let Some(p) = generator.priority(object_type) {
                let best = priority.entry(object_type).or_insert(p);
                *best = (*best).max(p);
            }
        }
    }

    let mut edges: BTreeSet<(ObjectType, ObjectType)> = BTreeSet::new();
    for generator in generators {
        for object_type in ObjectType::ALL {
            if generator.priority(object_type).is_none() {
                continue;
            }
            for &later in generator.run_before_types() {
                if later != object_type && priority.contains_key(&later) {
                    edges.insert((object_type, later));
                }
            }
            for &earlier in generator.run_after_types() {
                if earlier != object_type && priority.contains_key(&earlier) {
                    edges.insert((earlier, object_type));
                }
            }
        }
    }

    let mut in_degree: BTreeMap<ObjectType, usize> =
        priority.keys().map(|&t| (t, 0)).collect();
    for (_, to) in &edges {
        if let Some(degree) = in_degree.get_mut(to) {
            *degree += 1;
        }
    }

    let mut order = Vec::with_capacity(priority.len());
    loop {
        let next = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&t, _)| t)
            .max_by(|a, b| priority[a].cmp(&priority[b]).then_with(|| b.cmp(a)));
        let Some(next) = next else {
            break;
        };
        in_degree.remove(&next);
        for (_, to) in edges.iter().filter(|(from, _)| *from == next) {
            if let Some(degree) = in_degree.get_mut(to) {
                *degree -= 1;
            }
        }
        order.push(next);
    }

    if !in_degree.is_empty() {
        let mut types: Vec<String> = in_degree.keys().map(|t| t.name().to_string()).collect();
        types.sort();
        return Err(TidemarkError::OrderingConflict { types });
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ordered {
        types: &'static [ObjectType],
        priority: i32,
        before: &'static [ObjectType],
        after: &'static [ObjectType],
    }

    impl ChangeGenerator for Ordered {
        fn name(&self) -> &'static str {
            "Ordered"
        }

        fn priority(&self, object_type: ObjectType) -> Option<i32> {
            self.types.contains(&object_type).then_some(self.priority)
        }

        fn run_before_types(&self) -> &'static [ObjectType] {
            self.before
        }

        fn run_after_types(&self) -> &'static [ObjectType] {
            self.after
        }
    }

    fn boxed(generators: Vec<Ordered>) -> Vec<Box<dyn ChangeGenerator>> {
        generators
            .into_iter()
            .map(|g| Box::new(g) as Box<dyn ChangeGenerator>)
            .collect()
    }

    #[test]
    fn test_priority_orders_unconstrained_types() {
        let generators = boxed(vec![
            Ordered { types: &[ObjectType::Table], priority: 1, before: &[], after: &[] },
            Ordered { types: &[ObjectType::Sequence], priority: 3, before: &[], after: &[] },
        ]);
        assert_eq!(
            type_order(&generators).unwrap(),
            vec![ObjectType::Sequence, ObjectType::Table]
        );
    }

    #[test]
    fn test_constraint_overrides_priority() {
        let generators = boxed(vec![
            Ordered {
                types: &[ObjectType::Column],
                priority: 9,
                before: &[],
                after: &[ObjectType::Table],
            },
            Ordered { types: &[ObjectType::Table], priority: 1, before: &[], after: &[] },
        ]);
        assert_eq!(
            type_order(&generators).unwrap(),
            vec![ObjectType::Table, ObjectType::Column]
        );
    }

    #[test]
    fn test_chain_is_priority_descending() {
        let generators = boxed(vec![
            Ordered { types: &[ObjectType::Table], priority: 1, before: &[], after: &[] },
            Ordered { types: &[ObjectType::Table], priority: 7, before: &[], after: &[] },
            Ordered { types: &[ObjectType::Column], priority: 9, before: &[], after: &[] },
        ]);
        let priorities: Vec<Option<i32>> = chain(&generators, ObjectType::Table)
            .iter()
            .map(|g| g.priority(ObjectType::Table))
            .collect();
        assert_eq!(priorities, vec![Some(7), Some(1)]);
    }
}
