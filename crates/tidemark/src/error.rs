//! Error types for the dispatch and diff engines.

use crate::action::ValidationErrors;
use crate::structure::ObjectType;

/// Errors that can occur while resolving actions, diffing snapshots or
/// building the snapshot graph.
#[derive(Debug, thiserror::Error)]
pub enum TidemarkError {
    /// An action failed validation. Every problem found is carried.
    #[error("Validation failed:\n{0}")]
    Validation(ValidationErrors),

    /// No registered logic handles the action for the active dialect.
    #[error("Action '{action}' is not supported on {database}")]
    NotSupported {
        /// The action kind that could not be resolved.
        action: String,
        /// Short name of the active dialect.
        database: String,
    },

    /// The logic or generator catalog is malformed (e.g. a priority tie).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Delegation did not bottom out within the configured depth.
    #[error("Delegation loop detected while executing '{action}' (depth {depth})")]
    DelegationLoop {
        /// The action being resolved when the bound was hit.
        action: String,
        /// The depth that was exceeded.
        depth: usize,
    },

    /// The generator before/after constraints contain a cycle.
    #[error("Contradictory generator ordering between: {}", .types.join(", "))]
    OrderingConflict {
        /// Object types that take part in the cycle.
        types: Vec<String>,
    },

    /// A change generator failed for a specific object.
    #[error("Change generation failed for {object}: {source}")]
    GeneratorFailed {
        /// Identity of the object being diffed.
        object: String,
        /// The underlying failure.
        source: Box<TidemarkError>,
    },

    /// The snapshot graph violates one of its invariants.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A partial reference names more than one object.
    #[error("Reference '{reference}' is ambiguous: it matches {matches} {object_type} objects")]
    AmbiguousReference {
        /// The type searched.
        object_type: ObjectType,
        /// The reference as given.
        reference: String,
        /// Number of objects it matched.
        matches: usize,
    },

    /// The connection collaborator reported a failure.
    #[error("Connection error: {0}")]
    Connection(String),

    /// IO error (reading/writing snapshot files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TidemarkError {
    /// Returns true for usage or data problems the caller can react to.
    ///
    /// Catalog defects (configuration, delegation loops, ordering
    /// conflicts) are never recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::NotSupported { .. } | Self::AmbiguousReference { .. } => {
                true
            }
            Self::GeneratorFailed { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Result type for tidemark operations.
pub type Result<T> = std::result::Result<T, TidemarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let not_supported = TidemarkError::NotSupported {
            action: "addAutoIncrement".to_string(),
            database: "sqlite".to_string(),
        };
        assert!(not_supported.is_recoverable());

        let tie = TidemarkError::Configuration("tie".to_string());
        assert!(!tie.is_recoverable());

        let wrapped = TidemarkError::GeneratorFailed {
            object: "Sequence APP.SEQ".to_string(),
            source: Box::new(TidemarkError::DelegationLoop {
                action: "alterColumn".to_string(),
                depth: 32,
            }),
        };
        assert!(!wrapped.is_recoverable());
    }

    #[test]
    fn test_ordering_conflict_message() {
        let err = TidemarkError::OrderingConflict {
            types: vec!["Sequence".to_string(), "Table".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Contradictory generator ordering between: Sequence, Table"
        );
    }
}
