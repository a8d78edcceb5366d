//! Database dialect collaborators.
//!
//! A dialect knows its identity, its capabilities and how to spell types
//! and identifiers. Logic implementations consult it through the
//! [`Scope`](crate::scope::Scope) to decide whether they apply and to
//! build qualified names.

mod generic;
mod postgres;
mod sqlite;

use std::sync::Arc;

pub use generic::GenericDatabase;
pub use postgres::PostgresDatabase;
pub use sqlite::SqliteDatabase;

use crate::structure::ObjectReference;
use crate::types::DataType;

/// Name of the change-tracking table.
pub const DATABASE_CHANGELOG_TABLE: &str = "DATABASECHANGELOG";

/// Name of the change-tracking lock table.
pub const DATABASE_CHANGELOG_LOCK_TABLE: &str = "DATABASECHANGELOGLOCK";

/// Trait for the active database dialect.
pub trait Database: Send + Sync {
    /// Returns the dialect short name (e.g. `postgresql`).
    fn short_name(&self) -> &str;

    /// Returns the product name.
    fn product_name(&self) -> &str;

    /// Returns whether columns can be made auto-increment.
    fn supports_auto_increment(&self) -> bool;

    /// Returns whether the database has sequences.
    fn supports_sequences(&self) -> bool;

    /// Returns whether ALTER TABLE ... ALTER COLUMN is available.
    fn supports_alter_column(&self) -> bool;

    /// Returns the SQL type name for the given type.
    fn type_name(&self, data_type: &DataType) -> String;

    /// Returns the clause that turns a column into an identity column.
    fn auto_increment_clause(&self) -> &str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }

    /// Catalog holding the change-tracking tables, if any.
    fn changelog_catalog_name(&self) -> Option<String> {
        None
    }

    /// Schema holding the change-tracking tables, if any.
    fn changelog_schema_name(&self) -> Option<String> {
        None
    }

    /// Name of the change-tracking table.
    fn changelog_table_name(&self) -> String {
        DATABASE_CHANGELOG_TABLE.to_string()
    }

    /// Name of the change-tracking lock table.
    fn changelog_lock_table_name(&self) -> String {
        DATABASE_CHANGELOG_LOCK_TABLE.to_string()
    }

    /// Quote an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name)
    }

    /// Renders a qualified name with each segment quoted.
    fn qualify(&self, reference: &ObjectReference) -> String {
        reference
            .as_list()
            .iter()
            .map(|part| self.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Returns the built-in dialect with the given short name.
#[must_use]
pub fn by_short_name(short_name: &str) -> Option<Arc<dyn Database>> {
    match short_name.to_ascii_lowercase().as_str() {
        "generic" => Some(Arc::new(GenericDatabase::new())),
        "postgresql" | "postgres" => Some(Arc::new(PostgresDatabase::new())),
        "sqlite" => Some(Arc::new(SqliteDatabase::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_short_name() {
        assert_eq!(by_short_name("Postgres").unwrap().short_name(), "postgresql");
        assert_eq!(by_short_name("sqlite").unwrap().short_name(), "sqlite");
        assert!(by_short_name("oracle").is_none());
    }

    #[test]
    fn test_qualify_quotes_each_segment() {
        let db = PostgresDatabase::new();
        let reference: ObjectReference = "app.user".parse().unwrap();
        assert_eq!(db.qualify(&reference), "\"app\".\"user\"");
    }
}
