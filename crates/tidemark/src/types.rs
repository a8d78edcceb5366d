//! Abstract data types and the type-translation collaborator.
//!
//! Actions carry dialect-independent [`DataType`] values. The SQL spelling
//! is decided at execution time by the [`TypeTranslator`] found in the
//! [`Scope`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scope::Scope;

/// Dialect-independent SQL data types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInt,
    /// Small integer (16-bit).
    SmallInt,
    /// Unbounded text.
    Text,
    /// Variable-length character string.
    Varchar(usize),
    /// Fixed-length character string.
    Char(usize),
    /// Boolean.
    Boolean,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Timestamp.
    Timestamp,
    /// Floating point (single precision).
    Real,
    /// Floating point (double precision).
    Double,
    /// Decimal with precision and scale.
    Decimal(u8, u8),
    /// Binary large object.
    Blob,
    /// UUID.
    Uuid,
    /// A type the translator passes through verbatim.
    Custom(String),
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("INTEGER"),
            Self::BigInt => f.write_str("BIGINT"),
            Self::SmallInt => f.write_str("SMALLINT"),
            Self::Text => f.write_str("TEXT"),
            Self::Varchar(len) => write!(f, "VARCHAR({len})"),
            Self::Char(len) => write!(f, "CHAR({len})"),
            Self::Boolean => f.write_str("BOOLEAN"),
            Self::Date => f.write_str("DATE"),
            Self::Time => f.write_str("TIME"),
            Self::Timestamp => f.write_str("TIMESTAMP"),
            Self::Real => f.write_str("REAL"),
            Self::Double => f.write_str("DOUBLE"),
            Self::Decimal(p, s) => write!(f, "DECIMAL({p}, {s})"),
            Self::Blob => f.write_str("BLOB"),
            Self::Uuid => f.write_str("UUID"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

impl FromStr for DataType {
    type Err = std::convert::Infallible;

    /// Parses a type spelling. Unrecognized spellings become
    /// [`DataType::Custom`], so parsing never fails.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let (base, args) = match upper.find('(') {
            Some(open) if upper.ends_with(')') => (
                upper[..open].trim().to_string(),
                Some(upper[open + 1..upper.len() - 1].to_string()),
            ),
            _ => (upper.clone(), None),
        };
        let numbers: Vec<&str> = args
            .as_deref()
            .map(|a| a.split(',').map(str::trim).collect())
            .unwrap_or_default();

        let parsed = match (base.as_str(), numbers.as_slice()) {
            ("INT" | "INTEGER" | "INT4", []) => Some(Self::Integer),
            ("BIGINT" | "INT8", []) => Some(Self::BigInt),
            ("SMALLINT" | "INT2", []) => Some(Self::SmallInt),
            ("TEXT" | "CLOB", []) => Some(Self::Text),
            ("VARCHAR", [len]) => len.parse().ok().map(Self::Varchar),
            ("CHAR", [len]) => len.parse().ok().map(Self::Char),
            ("BOOLEAN" | "BOOL", []) => Some(Self::Boolean),
            ("DATE", []) => Some(Self::Date),
            ("TIME", []) => Some(Self::Time),
            ("TIMESTAMP" | "DATETIME", []) => Some(Self::Timestamp),
            ("REAL" | "FLOAT4", []) => Some(Self::Real),
            ("DOUBLE" | "DOUBLE PRECISION" | "FLOAT8", []) => Some(Self::Double),
            ("DECIMAL" | "NUMERIC", [p, s]) => match (p.parse(), s.parse()) {
                (Ok(p), Ok(s)) => Some(Self::Decimal(p, s)),
                _ => None,
            },
            ("BLOB" | "BYTEA", []) => Some(Self::Blob),
            ("UUID", []) => Some(Self::Uuid),
            _ => None,
        };

        Ok(parsed.unwrap_or_else(|| Self::Custom(trimmed.to_string())))
    }
}

/// Collaborator that spells an abstract type for the active dialect.
pub trait TypeTranslator: Send + Sync {
    /// Returns the dialect-correct SQL spelling of `data_type`.
    fn to_sql(&self, data_type: &DataType, scope: &Scope) -> String;
}

/// Translator that defers to the dialect's own type table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialectTypeTranslator;

impl TypeTranslator for DialectTypeTranslator {
    fn to_sql(&self, data_type: &DataType, scope: &Scope) -> String {
        scope.database().type_name(data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> DataType {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_known_types() {
        assert_eq!(parse("bigint"), DataType::BigInt);
        assert_eq!(parse("VARCHAR(255)"), DataType::Varchar(255));
        assert_eq!(parse("numeric(10, 2)"), DataType::Decimal(10, 2));
        assert_eq!(parse("double precision"), DataType::Double);
    }

    #[test]
    fn test_parse_unknown_is_custom() {
        assert_eq!(parse("geometry"), DataType::Custom("geometry".to_string()));
        assert_eq!(
            parse("VARCHAR(abc)"),
            DataType::Custom("VARCHAR(abc)".to_string())
        );
    }

    #[test]
    fn test_display_spelling() {
        assert_eq!(DataType::Decimal(8, 3).to_string(), "DECIMAL(8, 3)");
        assert_eq!(DataType::Custom("geometry".into()).to_string(), "geometry");
    }
}
