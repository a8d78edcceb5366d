//! Drives the generator chains over a snapshot comparison.

use tracing::{debug, info};

use crate::error::{Result, TidemarkError};
use crate::structure::{ObjectType, ObjectView};

use super::generator::{chain, type_order, GeneratorContext, GeneratorRegistry};
use super::{compare_snapshots, Change, ObjectDifferences};

/// Runs registered generators and collects their changes.
///
/// The visiting order of object types is computed once, when the engine
/// is built, so a contradictory catalog is rejected up front.
pub struct DiffEngine {
    registry: GeneratorRegistry,
    missing_order: Vec<ObjectType>,
    unexpected_order: Vec<ObjectType>,
    changed_order: Vec<ObjectType>,
}

impl DiffEngine {
    /// Creates an engine over `registry`.
    ///
    /// Fails with `OrderingConflict` if the generators' before/after
    /// constraints contradict each other.
    pub fn new(registry: GeneratorRegistry) -> Result<Self> {
        let missing_order = type_order(&registry.missing)?;
        let unexpected_order = type_order(&registry.unexpected)?;
        let changed_order = type_order(&registry.changed)?;
        debug!(
            missing = ?missing_order,
            unexpected = ?unexpected_order,
            changed = ?changed_order,
            "Computed generator type order"
        );
        Ok(Self {
            registry,
            missing_order,
            unexpected_order,
            changed_order,
        })
    }

    /// Creates an engine over the stock generators.
    pub fn with_core_generators() -> Result<Self> {
        Self::new(GeneratorRegistry::with_core_generators())
    }

    /// Order in which missing objects are visited.
    #[must_use]
    pub fn missing_order(&self) -> &[ObjectType] {
        &self.missing_order
    }

    /// Order in which unexpected objects are visited.
    #[must_use]
    pub fn unexpected_order(&self) -> &[ObjectType] {
        &self.unexpected_order
    }

    /// Order in which changed objects are visited.
    #[must_use]
    pub fn changed_order(&self) -> &[ObjectType] {
        &self.changed_order
    }

    /// Changes that create `missing`, an object only in the reference.
    pub fn fix_missing(
        &self,
        missing: &ObjectView<'_>,
        context: &GeneratorContext<'_>,
    ) -> Result<Vec<Change>> {
        for generator in chain(&self.registry.missing, missing.object_type()) {
            let fixed = generator
                .fix_missing(missing, context)
                .map_err(|e| failed(missing, e))?;
            if let Some(changes) = fixed {
                debug!(generator = generator.name(), object = %missing.describe(), count = changes.len(), "Fixed missing object");
                return Ok(changes);
            }
        }
        Ok(Vec::new())
    }

    /// Changes that remove `unexpected`, an object only in the comparison.
    pub fn fix_unexpected(
        &self,
        unexpected: &ObjectView<'_>,
        context: &GeneratorContext<'_>,
    ) -> Result<Vec<Change>> {
        for generator in chain(&self.registry.unexpected, unexpected.object_type()) {
            let fixed = generator
                .fix_unexpected(unexpected, context)
                .map_err(|e| failed(unexpected, e))?;
            if let Some(changes) = fixed {
                debug!(generator = generator.name(), object = %unexpected.describe(), count = changes.len(), "Fixed unexpected object");
                return Ok(changes);
            }
        }
        Ok(Vec::new())
    }

    /// Changes that reconcile `changed`, the reference side of an object
    /// present in both snapshots.
    pub fn generate_changes(
        &self,
        changed: &ObjectView<'_>,
        differences: &ObjectDifferences,
        context: &GeneratorContext<'_>,
    ) -> Result<Vec<Change>> {
        for generator in chain(&self.registry.changed, changed.object_type()) {
            let fixed = generator
                .fix_changed(changed, differences, context)
                .map_err(|e| failed(changed, e))?;
            if let Some(changes) = fixed {
                debug!(generator = generator.name(), object = %changed.describe(), count = changes.len(), "Fixed changed object");
                return Ok(changes);
            }
        }
        Ok(Vec::new())
    }

    /// Compares the context's snapshots and returns every change needed to
    /// turn the comparison into the reference.
    ///
    /// Missing objects come first, then unexpected, then changed. Within
    /// each group types follow the computed order and objects of one type
    /// follow their qualified name.
    pub fn diff_snapshots(&self, context: &GeneratorContext<'_>) -> Result<Vec<Change>> {
        let result = compare_snapshots(context.reference, context.comparison);
        let mut changes = Vec::new();

        for &object_type in &self.missing_order {
            for missing in result.missing_of(object_type) {
                changes.extend(self.fix_missing(missing, context)?);
            }
        }
        for &object_type in &self.unexpected_order {
            for unexpected in result.unexpected_of(object_type) {
                changes.extend(self.fix_unexpected(unexpected, context)?);
            }
        }
        for &object_type in &self.changed_order {
            for changed in result.changed_of(object_type) {
                changes.extend(self.generate_changes(
                    &changed.reference,
                    &changed.differences,
                    context,
                )?);
            }
        }

        info!(
            missing = result.missing().len(),
            unexpected = result.unexpected().len(),
            changed = result.changed().len(),
            changes = changes.len(),
            "Generated changes"
        );
        Ok(changes)
    }
}

impl std::fmt::Debug for DiffEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffEngine")
            .field("missing_order", &self.missing_order)
            .field("unexpected_order", &self.unexpected_order)
            .field("changed_order", &self.changed_order)
            .finish_non_exhaustive()
    }
}

fn failed(view: &ObjectView<'_>, source: TidemarkError) -> TidemarkError {
    TidemarkError::GeneratorFailed {
        object: view.describe(),
        source: Box::new(source),
    }
}
