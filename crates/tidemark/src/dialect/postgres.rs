//! PostgreSQL dialect.

use crate::types::DataType;

use super::Database;

/// PostgreSQL dialect.
#[derive(Debug, Clone, Default)]
pub struct PostgresDatabase;

impl PostgresDatabase {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Database for PostgresDatabase {
    fn short_name(&self) -> &str {
        "postgresql"
    }

    fn product_name(&self) -> &str {
        "PostgreSQL"
    }

    fn supports_auto_increment(&self) -> bool {
        true
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn supports_alter_column(&self) -> bool {
        true
    }

    fn type_name(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Double => "DOUBLE PRECISION".to_string(),
            DataType::Decimal(p, s) => format!("NUMERIC({p}, {s})"),
            DataType::Blob => "BYTEA".to_string(),
            other => other.to_string(),
        }
    }

    fn changelog_schema_name(&self) -> Option<String> {
        Some("public".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        let db = PostgresDatabase::new();
        assert_eq!(db.type_name(&DataType::BigInt), "BIGINT");
        assert_eq!(db.type_name(&DataType::Blob), "BYTEA");
        assert_eq!(db.type_name(&DataType::Decimal(10, 2)), "NUMERIC(10, 2)");
    }
}
