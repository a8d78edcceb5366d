//! Immutable, hierarchical execution context.
//!
//! Every dispatch and diff operation receives a [`Scope`] explicitly. A
//! child scope shadows settings of its parent and inherits everything else;
//! nothing in a scope changes after it is built.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::connection::Connection;
use crate::dialect::Database;
use crate::error::{Result, TidemarkError};
use crate::types::{DataType, DialectTypeTranslator, TypeTranslator};

/// Context carrying the active dialect and its collaborators.
#[derive(Clone)]
pub struct Scope {
    database: Arc<dyn Database>,
    connection: Option<Arc<dyn Connection>>,
    type_translator: Arc<dyn TypeTranslator>,
    settings: BTreeMap<String, String>,
    parent: Option<Arc<Scope>>,
}

impl Scope {
    /// Creates a root scope for the given dialect.
    pub fn new(database: Arc<dyn Database>) -> Self {
        Self {
            database,
            connection: None,
            type_translator: Arc::new(DialectTypeTranslator),
            settings: BTreeMap::new(),
            parent: None,
        }
    }

    /// Attaches a connection.
    #[must_use]
    pub fn with_connection(mut self, connection: Arc<dyn Connection>) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Replaces the type translator.
    #[must_use]
    pub fn with_type_translator(mut self, translator: Arc<dyn TypeTranslator>) -> Self {
        self.type_translator = translator;
        self
    }

    /// Adds a setting to this scope.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Creates a child scope with one additional setting.
    #[must_use]
    pub fn child(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut settings = BTreeMap::new();
        settings.insert(key.into(), value.into());
        Self {
            database: Arc::clone(&self.database),
            connection: self.connection.clone(),
            type_translator: Arc::clone(&self.type_translator),
            settings,
            parent: Some(Arc::new(self.clone())),
        }
    }

    /// Looks up a setting, walking up the parent chain.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings
            .get(key)
            .map(String::as_str)
            .or_else(|| self.parent.as_deref().and_then(|parent| parent.get(key)))
    }

    /// Returns the active dialect.
    #[must_use]
    pub fn database(&self) -> &dyn Database {
        self.database.as_ref()
    }

    /// Returns the connection, failing when the scope has none.
    pub fn connection(&self) -> Result<&dyn Connection> {
        self.connection.as_deref().ok_or_else(|| {
            TidemarkError::Connection(format!(
                "no connection available for {}",
                self.database.short_name()
            ))
        })
    }

    /// Returns the type translator.
    #[must_use]
    pub fn type_translator(&self) -> &dyn TypeTranslator {
        self.type_translator.as_ref()
    }

    /// Spells a data type for the active dialect.
    #[must_use]
    pub fn type_sql(&self, data_type: &DataType) -> String {
        self.type_translator.to_sql(data_type, self)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("database", &self.database.short_name())
            .field("connection", &self.connection.is_some())
            .field("settings", &self.settings)
            .field("parent", &self.parent)
            .finish()
    }
}
