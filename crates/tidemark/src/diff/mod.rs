//! Diff change-generation pipeline.
//!
//! Two snapshots are compared object by object ([`compare_snapshots`]),
//! then the [`DiffEngine`] hands every missing, unexpected and changed
//! object to the generator chain registered for its type. Object types are
//! visited in an order computed from the generators' before/after
//! constraints, so dependent changes come after the changes they rely on.

mod change;
mod compare;
mod control;
mod differences;
mod engine;
pub mod generator;

pub use change::Change;
pub use compare::{compare_snapshots, ChangedObject, DiffResult};
pub use control::DiffOutputControl;
pub use differences::{ComparedValue, Difference, ObjectDifferences};
pub use engine::DiffEngine;
pub use generator::{
    ChangeGenerator, ChangedObjectChangeGenerator, GeneratorContext, GeneratorRegistry,
    MissingObjectChangeGenerator, UnexpectedObjectChangeGenerator,
};
