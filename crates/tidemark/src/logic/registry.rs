//! Registry of action logics.

use std::fmt;

use crate::action::ActionKind;
use crate::scope::Scope;

use super::ActionLogic;

/// Every logic known to an engine.
///
/// Registration happens once during startup; afterwards the registry is
/// only read and may be shared across threads.
#[derive(Default)]
pub struct LogicRegistry {
    logics: Vec<Box<dyn ActionLogic>>,
}

impl LogicRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the core logic catalog.
    #[must_use]
    pub fn with_core_logic() -> Self {
        let mut registry = Self::new();
        super::core::register_all(&mut registry);
        registry
    }

    /// Registers a logic.
    pub fn register(&mut self, logic: impl ActionLogic + 'static) -> &mut Self {
        self.logics.push(Box::new(logic));
        self
    }

    /// Returns the logics that declare `kind` and accept `scope`, in
    /// registration order.
    #[must_use]
    pub fn candidates(&self, kind: ActionKind, scope: &Scope) -> Vec<&dyn ActionLogic> {
        self.logics
            .iter()
            .map(|logic| &**logic)
            .filter(|logic| logic.supported_action().matches(kind) && logic.supports_scope(scope))
            .collect()
    }

    /// Number of registered logics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.logics.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logics.is_empty()
    }
}

impl fmt::Debug for LogicRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.logics.iter().map(|logic| logic.name()))
            .finish()
    }
}
