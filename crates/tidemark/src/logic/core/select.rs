//! Query logics over user and change-tracking tables.

use crate::action::{
    Action, ActionKind, ActionResult, SelectFromDatabaseChangeLogAction, ValidationErrors,
};
use crate::error::Result;
use crate::logic::{unexpected_action, unexpected_action_errors, ActionLogic, ActionMatch};
use crate::scope::Scope;
use crate::structure::ObjectReference;

/// Qualified name of a change-tracking table as the dialect places it.
fn changelog_reference(scope: &Scope, table: String) -> ObjectReference {
    let db = scope.database();
    ObjectReference::new(
        [db.changelog_catalog_name(), db.changelog_schema_name(), Some(table)]
            .into_iter()
            .flatten(),
    )
}

/// Renders `SELECT <columns> FROM <table>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectDataLogic;

impl ActionLogic for SelectDataLogic {
    fn name(&self) -> &'static str {
        "SelectDataLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::SelectData)
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::SelectData(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        errors.check_required_field("tableName", &action.table_name);
        errors
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::SelectData(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let table = inner.table_name.clone().unwrap_or_default();
        let columns = if inner.columns.is_empty() {
            "*".to_string()
        } else {
            inner.columns.join(", ")
        };
        Ok(ActionResult::sql(format!(
            "SELECT {columns} FROM {}",
            scope.database().qualify(&table)
        )))
    }
}

/// Reads the change-tracking table through [`SelectDataLogic`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectFromDatabaseChangeLogLogic;

impl ActionLogic for SelectFromDatabaseChangeLogLogic {
    fn name(&self) -> &'static str {
        "SelectFromDatabaseChangeLogLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::SelectFromDatabaseChangeLog)
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::SelectFromDatabaseChangeLog(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let table = changelog_reference(scope, scope.database().changelog_table_name());
        Ok(ActionResult::delegate([Action::select_data(
            table,
            inner.select_columns.clone(),
        )]))
    }
}

/// Reads the change-tracking lock table through [`SelectDataLogic`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectFromDatabaseChangeLogLockLogic;

impl ActionLogic for SelectFromDatabaseChangeLogLockLogic {
    fn name(&self) -> &'static str {
        "SelectFromDatabaseChangeLogLockLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::SelectFromDatabaseChangeLogLock)
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::SelectFromDatabaseChangeLogLock(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        errors.check_required_field("selectColumns", &action.select_columns);
        errors
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::SelectFromDatabaseChangeLogLock(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let table = changelog_reference(scope, scope.database().changelog_lock_table_name());
        Ok(ActionResult::delegate([Action::select_data(
            table,
            inner.select_columns.clone(),
        )]))
    }
}

/// Asks the change-tracking table for its highest execution order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetNextChangeSetSequenceValueLogic;

impl ActionLogic for GetNextChangeSetSequenceValueLogic {
    fn name(&self) -> &'static str {
        "GetNextChangeSetSequenceValueLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::GetNextChangeSetSequenceValue)
    }

    fn execute(&self, _action: &Action, _scope: &Scope) -> Result<ActionResult> {
        Ok(ActionResult::delegate([Action::SelectFromDatabaseChangeLog(
            SelectFromDatabaseChangeLogAction {
                select_columns: vec!["MAX(ORDEREXECUTED)".to_string()],
            },
        )]))
    }
}
