//! Action logic dispatch.
//!
//! An [`ActionLogic`] implements one action kind (or a whole family) for
//! the dialects it accepts. The [`LogicRegistry`] holds every logic known
//! at startup and the [`ActionEngine`] resolves, validates, checks and
//! executes actions against it.

pub mod core;
mod engine;
mod registry;

pub use engine::{ActionEngine, EngineOptions};
pub use registry::LogicRegistry;

use crate::action::{Action, ActionFamily, ActionKind, ActionResult, ActionStatus, ValidationErrors};
use crate::error::{Result, TidemarkError};
use crate::scope::Scope;

/// Priority of a general-purpose logic.
pub const PRIORITY_DEFAULT: i32 = 1;

/// Priority of a dialect-specific logic that overrides the default.
pub const PRIORITY_SPECIALIZED: i32 = 5;

/// Priority of a family-wide fallback.
pub const PRIORITY_FALLBACK: i32 = 0;

/// Which actions a logic declares itself for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMatch {
    /// Exactly one action kind.
    Kind(ActionKind),
    /// Every kind in a family.
    Family(ActionFamily),
}

impl ActionMatch {
    /// Returns true if `kind` is covered.
    #[must_use]
    pub fn matches(self, kind: ActionKind) -> bool {
        match self {
            Self::Kind(k) => k == kind,
            Self::Family(family) => kind.family() == family,
        }
    }
}

/// Dialect-specific implementation of an action.
pub trait ActionLogic: Send + Sync {
    /// Name used in logs and configuration errors.
    fn name(&self) -> &'static str;

    /// The action kind or family this logic handles.
    fn supported_action(&self) -> ActionMatch;

    /// Higher priorities win during resolution.
    fn priority(&self) -> i32 {
        PRIORITY_DEFAULT
    }

    /// Lets a logic opt out for dialects lacking a capability.
    fn supports_scope(&self, _scope: &Scope) -> bool {
        true
    }

    /// Checks required fields and semantic constraints.
    fn validate(&self, _action: &Action, _scope: &Scope) -> ValidationErrors {
        ValidationErrors::new()
    }

    /// Classifies whether the action's effect already holds.
    fn check_status(&self, action: &Action, _scope: &Scope) -> Result<ActionStatus> {
        Ok(ActionStatus::unknown(format!(
            "status checking is not implemented for {}",
            action.kind()
        )))
    }

    /// Produces SQL or replacement actions.
    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult>;
}

/// Error for a logic invoked with an action it does not handle.
pub(crate) fn unexpected_action(logic: &str, action: &Action) -> TidemarkError {
    TidemarkError::Configuration(format!("{logic} cannot handle {}", action.kind()))
}

/// Validation result for a logic invoked with an action it does not handle.
pub(crate) fn unexpected_action_errors(logic: &str, action: &Action) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(format!("{logic} cannot handle {}", action.kind()));
    errors
}
