//! Configurable dialect following standard SQL.

use crate::types::DataType;

use super::Database;

/// A standard-SQL dialect whose capabilities can be switched per test or
/// per deployment.
#[derive(Debug, Clone)]
pub struct GenericDatabase {
    short_name: String,
    auto_increment: bool,
    sequences: bool,
    alter_column: bool,
    changelog_schema: Option<String>,
}

impl GenericDatabase {
    /// Creates a dialect supporting every capability.
    #[must_use]
    pub fn new() -> Self {
        Self {
            short_name: "generic".to_string(),
            auto_increment: true,
            sequences: true,
            alter_column: true,
            changelog_schema: None,
        }
    }

    /// Sets the short name reported by the dialect.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.short_name = name.into();
        self
    }

    /// Sets auto-increment support.
    #[must_use]
    pub fn auto_increment(mut self, supported: bool) -> Self {
        self.auto_increment = supported;
        self
    }

    /// Sets sequence support.
    #[must_use]
    pub fn sequences(mut self, supported: bool) -> Self {
        self.sequences = supported;
        self
    }

    /// Sets ALTER COLUMN support.
    #[must_use]
    pub fn alter_column(mut self, supported: bool) -> Self {
        self.alter_column = supported;
        self
    }

    /// Places the change-tracking tables in a schema.
    #[must_use]
    pub fn changelog_schema(mut self, schema: impl Into<String>) -> Self {
        self.changelog_schema = Some(schema.into());
        self
    }
}

impl Default for GenericDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for GenericDatabase {
    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn product_name(&self) -> &str {
        "Generic SQL"
    }

    fn supports_auto_increment(&self) -> bool {
        self.auto_increment
    }

    fn supports_sequences(&self) -> bool {
        self.sequences
    }

    fn supports_alter_column(&self) -> bool {
        self.alter_column
    }

    fn type_name(&self, data_type: &DataType) -> String {
        data_type.to_string()
    }

    fn changelog_schema_name(&self) -> Option<String> {
        self.changelog_schema.clone()
    }

    /// Quotes only names that are not plain identifiers.
    fn quote_identifier(&self, name: &str) -> String {
        let plain = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain {
            name.to_string()
        } else {
            format!("\"{}\"", name.replace('"', "\"\""))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_only_when_needed() {
        let db = GenericDatabase::new();
        assert_eq!(db.quote_identifier("USER_ID"), "USER_ID");
        assert_eq!(db.quote_identifier("order items"), "\"order items\"");
        assert_eq!(db.quote_identifier("1st"), "\"1st\"");
    }

    #[test]
    fn test_capabilities_are_configurable() {
        let db = GenericDatabase::new().auto_increment(false).named("legacy");
        assert!(!db.supports_auto_increment());
        assert!(db.supports_sequences());
        assert_eq!(db.short_name(), "legacy");
    }
}
