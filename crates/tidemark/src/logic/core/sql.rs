//! Raw SQL.

use crate::action::{Action, ActionKind, ActionResult, ValidationErrors};
use crate::error::Result;
use crate::logic::{unexpected_action, unexpected_action_errors, ActionLogic, ActionMatch};
use crate::scope::Scope;

/// Passes caller-supplied SQL through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteSqlLogic;

impl ActionLogic for ExecuteSqlLogic {
    fn name(&self) -> &'static str {
        "ExecuteSqlLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::ExecuteSql)
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::ExecuteSql(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        errors.check_required_field("sql", &action.sql);
        errors
    }

    fn execute(&self, action: &Action, _scope: &Scope) -> Result<ActionResult> {
        let Action::ExecuteSql(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        Ok(ActionResult::sql(inner.sql.clone().unwrap_or_default().trim()))
    }
}
