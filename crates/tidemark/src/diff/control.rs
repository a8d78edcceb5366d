//! Presentation options for generated changes.

use crate::structure::{ObjectReference, ObjectType, ObjectView};

/// Controls which qualifiers appear on generated changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOutputControl {
    /// Include catalog names.
    pub include_catalog: bool,
    /// Include schema names.
    pub include_schema: bool,
}

impl DiffOutputControl {
    /// Creates a control that leaves out catalog and schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets catalog inclusion.
    #[must_use]
    pub fn include_catalog(mut self, include: bool) -> Self {
        self.include_catalog = include;
        self
    }

    /// Sets schema inclusion.
    #[must_use]
    pub fn include_schema(mut self, include: bool) -> Self {
        self.include_schema = include;
        self
    }

    /// Builds the reference a change should carry for an object.
    ///
    /// Catalog and schema segments appear only when enabled; the remaining
    /// containers (e.g. a column's table) always do.
    #[must_use]
    pub fn reference(&self, view: &ObjectView<'_>) -> ObjectReference {
        let mut parts = vec![view.name().to_string()];
        let mut current = view.container();
        while let Some(container) = current {
            let keep = match container.object_type() {
                ObjectType::Catalog => self.include_catalog,
                ObjectType::Schema => self.include_schema,
                _ => true,
            };
            if keep {
                parts.push(container.name().to_string());
            }
            current = container.container();
        }
        parts.reverse();
        ObjectReference::new(parts)
    }
}
