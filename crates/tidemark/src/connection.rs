//! Connection collaborator.
//!
//! Logics read the live database through [`Connection::lookup`] when
//! checking status, and the runner hands terminal statements to
//! [`Connection::execute`]. Transaction boundaries belong to the
//! implementation.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::{Result, TidemarkError};
use crate::snapshot::DatabaseSnapshot;
use crate::structure::{DatabaseObject, ObjectReference, ObjectType};

/// Read and execute paths into a database.
pub trait Connection: Send + Sync {
    /// Looks up an object by (possibly partial) qualified name.
    fn lookup(
        &self,
        object_type: ObjectType,
        reference: &ObjectReference,
    ) -> Result<Option<DatabaseObject>>;

    /// Executes one statement.
    fn execute(&self, sql: &str) -> Result<()>;
}

/// A connection backed by a captured snapshot.
///
/// Lookups answer from the snapshot. Executed statements are recorded
/// rather than applied.
#[derive(Debug)]
pub struct SnapshotConnection {
    snapshot: DatabaseSnapshot,
    executed: Mutex<Vec<String>>,
}

impl SnapshotConnection {
    /// Creates a connection over a snapshot.
    #[must_use]
    pub fn new(snapshot: DatabaseSnapshot) -> Self {
        Self {
            snapshot,
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Returns the backing snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &DatabaseSnapshot {
        &self.snapshot
    }

    /// Returns every statement executed so far, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Connection for SnapshotConnection {
    fn lookup(
        &self,
        object_type: ObjectType,
        reference: &ObjectReference,
    ) -> Result<Option<DatabaseObject>> {
        Ok(self
            .snapshot
            .find(object_type, reference)?
            .map(|view| view.object().clone()))
    }

    fn execute(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Recording statement");
        self.executed
            .lock()
            .map_err(|_| TidemarkError::Connection("statement log is poisoned".to_string()))?
            .push(sql.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{DatabaseInfo, SnapshotBuilder, SnapshotControl};

    #[test]
    fn test_lookup_and_record() {
        let mut builder = SnapshotBuilder::new(DatabaseInfo::default(), SnapshotControl::all());
        let schema = builder.add(ObjectType::Schema, "APP", None).unwrap();
        builder.add(ObjectType::Table, "USER", Some(schema)).unwrap();
        let connection = SnapshotConnection::new(builder.build().unwrap());

        let table = connection
            .lookup(ObjectType::Table, &"APP.USER".parse().unwrap())
            .unwrap();
        assert_eq!(table.map(|t| t.name), Some("USER".to_string()));
        assert!(connection
            .lookup(ObjectType::Table, &"APP.ORDERS".parse().unwrap())
            .unwrap()
            .is_none());

        connection.execute("SELECT 1").unwrap();
        assert_eq!(connection.executed(), vec!["SELECT 1".to_string()]);
    }
}
