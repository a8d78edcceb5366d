//! SQLite dialect.
//!
//! SQLite has no sequences, cannot alter column definitions in place and
//! only allows auto-increment on an INTEGER PRIMARY KEY declared at table
//! creation, so the matching logics opt out.

use crate::types::DataType;

use super::Database;

/// SQLite dialect.
#[derive(Debug, Clone, Default)]
pub struct SqliteDatabase;

impl SqliteDatabase {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Database for SqliteDatabase {
    fn short_name(&self) -> &str {
        "sqlite"
    }

    fn product_name(&self) -> &str {
        "SQLite"
    }

    fn supports_auto_increment(&self) -> bool {
        false
    }

    fn supports_sequences(&self) -> bool {
        false
    }

    fn supports_alter_column(&self) -> bool {
        false
    }

    fn type_name(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Integer | DataType::SmallInt | DataType::BigInt | DataType::Boolean => {
                "INTEGER".to_string()
            }
            DataType::Text
            | DataType::Varchar(_)
            | DataType::Char(_)
            | DataType::Date
            | DataType::Time
            | DataType::Timestamp
            | DataType::Uuid => "TEXT".to_string(),
            DataType::Real | DataType::Double => "REAL".to_string(),
            DataType::Decimal(_, _) => "NUMERIC".to_string(),
            DataType::Blob => "BLOB".to_string(),
            DataType::Custom(name) => name.clone(),
        }
    }
}
