//! Dialect-aware action dispatch and snapshot diffing for database
//! migrations.
//!
//! `tidemark` turns abstract schema edits into dialect-correct SQL and
//! computes the edits needed to make one schema match another.
//!
//! # Architecture
//!
//! - **Snapshot** - An immutable graph of database objects (tables,
//!   columns, sequences, ...) with per-type attribute schemas
//! - **Dialect** - Capability predicates and naming rules of a database
//! - **Dispatch** - Resolves an [`action::Action`] to the highest-priority
//!   logic for the active dialect, validates it, checks whether it is
//!   already applied and expands it into SQL, following delegation
//! - **Diff** - Compares two snapshots and runs ordered generator chains
//!   to produce [`diff::Change`]s
//! - **Serializer** - Renders a snapshot as deterministic readable text
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tidemark::prelude::*;
//!
//! let engine = ActionEngine::default();
//! let scope = Scope::new(Arc::new(GenericDatabase::new()));
//!
//! let action = Action::add_auto_increment("APP.USER.ID", DataType::BigInt);
//! let result = engine.execute(&action, &scope).unwrap();
//! assert_eq!(
//!     result.statements,
//!     vec!["ALTER TABLE APP.USER ALTER COLUMN ID BIGINT GENERATED BY DEFAULT AS IDENTITY"]
//! );
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Print a stored snapshot
//! tidemark snapshot schema.json
//!
//! # Print the changes that turn `current.json` into `desired.json`
//! tidemark diff desired.json current.json --sql --dialect postgresql
//! ```

pub mod action;
pub mod connection;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod logic;
pub mod runner;
pub mod scope;
pub mod serializer;
pub mod snapshot;
pub mod structure;
pub mod types;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::action::{
        Action, ActionFamily, ActionKind, ActionResult, ActionStatus, Clause, Clauses,
        ColumnDefinition, SequenceSettings, TerminalResult, ValidationErrors, Verdict,
    };
    pub use crate::connection::{Connection, SnapshotConnection};
    pub use crate::dialect::{Database, GenericDatabase, PostgresDatabase, SqliteDatabase};
    pub use crate::diff::{
        compare_snapshots, Change, DiffEngine, DiffOutputControl, GeneratorContext,
        GeneratorRegistry, ObjectDifferences,
    };
    pub use crate::error::{Result, TidemarkError};
    pub use crate::logic::{ActionEngine, ActionLogic, ActionMatch, EngineOptions, LogicRegistry};
    pub use crate::runner::{ActionRunner, RunOutcome};
    pub use crate::scope::Scope;
    pub use crate::serializer::SnapshotSerializer;
    pub use crate::snapshot::{DatabaseInfo, DatabaseSnapshot, SnapshotBuilder, SnapshotControl};
    pub use crate::structure::{
        AttributeValue, DatabaseObject, ObjectReference, ObjectType, ObjectView, SnapshotId,
    };
    pub use crate::types::{DataType, TypeTranslator};
}
