//! Snapshot comparison.

use std::collections::BTreeMap;

use tracing::debug;

use crate::snapshot::DatabaseSnapshot;
use crate::structure::{ObjectType, ObjectView};

use super::ObjectDifferences;

/// An object present in both snapshots whose attributes differ.
#[derive(Debug, Clone)]
pub struct ChangedObject<'a> {
    /// The object as it should be.
    pub reference: ObjectView<'a>,
    /// The object as it is.
    pub comparison: ObjectView<'a>,
    /// Per-attribute comparison.
    pub differences: ObjectDifferences,
}

/// Outcome of comparing a reference snapshot against a comparison one.
///
/// Missing objects exist only in the reference, unexpected objects only in
/// the comparison. Each list is ordered by type, then qualified name.
#[derive(Debug, Clone)]
pub struct DiffResult<'a> {
    reference: &'a DatabaseSnapshot,
    comparison: &'a DatabaseSnapshot,
    missing: Vec<ObjectView<'a>>,
    unexpected: Vec<ObjectView<'a>>,
    changed: Vec<ChangedObject<'a>>,
}

impl<'a> DiffResult<'a> {
    /// Returns the reference snapshot.
    #[must_use]
    pub fn reference(&self) -> &'a DatabaseSnapshot {
        self.reference
    }

    /// Returns the comparison snapshot.
    #[must_use]
    pub fn comparison(&self) -> &'a DatabaseSnapshot {
        self.comparison
    }

    /// Objects only in the reference snapshot.
    #[must_use]
    pub fn missing(&self) -> &[ObjectView<'a>] {
        &self.missing
    }

    /// Objects only in the comparison snapshot.
    #[must_use]
    pub fn unexpected(&self) -> &[ObjectView<'a>] {
        &self.unexpected
    }

    /// Objects in both snapshots that differ.
    #[must_use]
    pub fn changed(&self) -> &[ChangedObject<'a>] {
        &self.changed
    }

    /// Missing objects of one type.
    pub fn missing_of(&self, object_type: ObjectType) -> impl Iterator<Item = &ObjectView<'a>> {
        self.missing.iter().filter(move |v| v.object_type() == object_type)
    }

    /// Unexpected objects of one type.
    pub fn unexpected_of(&self, object_type: ObjectType) -> impl Iterator<Item = &ObjectView<'a>> {
        self.unexpected.iter().filter(move |v| v.object_type() == object_type)
    }

    /// Changed objects of one type.
    pub fn changed_of(&self, object_type: ObjectType) -> impl Iterator<Item = &ChangedObject<'a>> {
        self.changed
            .iter()
            .filter(move |c| c.reference.object_type() == object_type)
    }

    /// Returns true if the snapshots hold the same objects with the same
    /// attributes.
    #[must_use]
    pub fn are_equal(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.changed.is_empty()
    }

    /// Returns true if `view` (from the comparison snapshot) has no
    /// counterpart in the reference snapshot.
    #[must_use]
    pub fn is_unexpected(&self, view: &ObjectView<'_>) -> bool {
        self.unexpected.iter().any(|u| u.id() == view.id())
    }

    /// Returns true if `view` (from the reference snapshot) has no
    /// counterpart in the comparison snapshot.
    #[must_use]
    pub fn is_missing(&self, view: &ObjectView<'_>) -> bool {
        self.missing.iter().any(|m| m.id() == view.id())
    }
}

type Key = (ObjectType, String);

fn index<'a>(snapshot: &'a DatabaseSnapshot, types: &[ObjectType]) -> BTreeMap<Key, Vec<ObjectView<'a>>> {
    let mut map: BTreeMap<Key, Vec<ObjectView<'a>>> = BTreeMap::new();
    for view in snapshot.objects() {
        if types.contains(&view.object_type()) {
            map.entry((view.object_type(), view.relative_reference().to_string()))
                .or_default()
                .push(view);
        }
    }
    map
}

/// Matches objects by type and catalog-relative name and compares their
/// attributes.
///
/// Only types included in both snapshots take part. Object-valued
/// attributes compare by name, never by snapshot id. Objects sharing a
/// name are paired in capture order; whatever is left over on either side
/// is reported as missing or unexpected.
#[must_use]
pub fn compare_snapshots<'a>(
    reference: &'a DatabaseSnapshot,
    comparison: &'a DatabaseSnapshot,
) -> DiffResult<'a> {
    let types: Vec<ObjectType> = ObjectType::ALL
        .into_iter()
        .filter(|t| reference.control().includes(*t) && comparison.control().includes(*t))
        .collect();
    let left = index(reference, &types);
    let right = index(comparison, &types);

    let mut missing = Vec::new();
    let mut changed = Vec::new();
    let mut unexpected = Vec::new();
    for (key, views) in &left {
        let others = right.get(key).map_or(&[][..], Vec::as_slice);
        for (view, other) in views.iter().zip(others) {
            let differences = ObjectDifferences::compare(view, other);
            if differences.has_differences() {
                changed.push(ChangedObject {
                    reference: *view,
                    comparison: *other,
                    differences,
                });
            }
        }
        missing.extend(views.iter().skip(others.len()).copied());
        unexpected.extend(others.iter().skip(views.len()).copied());
    }
    unexpected.extend(
        right
            .iter()
            .filter(|(key, _)| !left.contains_key(*key))
            .flat_map(|(_, views)| views.iter().copied()),
    );
    unexpected.sort_by_cached_key(|view| (view.object_type(), view.relative_reference().to_string()));

    debug!(
        missing = missing.len(),
        unexpected = unexpected.len(),
        changed = changed.len(),
        "Compared snapshots"
    );

    DiffResult {
        reference,
        comparison,
        missing,
        unexpected,
        changed,
    }
}
