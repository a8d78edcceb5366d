//! Table logics.

use crate::action::{Action, ActionKind, ActionResult, ActionStatus, ValidationErrors};
use crate::error::Result;
use crate::logic::{unexpected_action, unexpected_action_errors, ActionLogic, ActionMatch};
use crate::scope::Scope;
use crate::structure::ObjectType;

use super::{column_definition, lookup};

/// Renders `CREATE TABLE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateTableLogic;

impl ActionLogic for CreateTableLogic {
    fn name(&self) -> &'static str {
        "CreateTableLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::CreateTable)
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::CreateTable(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        errors.check_required_field("tableName", &action.table_name);
        errors.check_required_field("columns", &action.columns);
        for key in &action.primary_key {
            errors.check(
                action.columns.iter().any(|c| c.name == *key),
                format!("Primary key column '{key}' is not defined"),
            );
        }
        errors
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::CreateTable(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let table = action.table_name.clone().unwrap_or_default();
        Ok(match lookup(scope, ObjectType::Table, &table)? {
            Some(_) => ActionStatus::applied(),
            None => ActionStatus::incorrect(format!("Table '{table}' does not exist")),
        })
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::CreateTable(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let db = scope.database();
        let table = inner.table_name.clone().unwrap_or_default();
        let mut definitions: Vec<String> = inner
            .columns
            .iter()
            .map(|c| column_definition(scope, c))
            .collect();
        if !inner.primary_key.is_empty() {
            let keys: Vec<String> = inner
                .primary_key
                .iter()
                .map(|k| db.quote_identifier(k))
                .collect();
            definitions.push(format!("PRIMARY KEY ({})", keys.join(", ")));
        }
        Ok(ActionResult::sql(format!(
            "CREATE TABLE {} (\n  {}\n)",
            db.qualify(&table),
            definitions.join(",\n  ")
        )))
    }
}

/// Renders `DROP TABLE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropTableLogic;

impl ActionLogic for DropTableLogic {
    fn name(&self) -> &'static str {
        "DropTableLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::DropTable)
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::DropTable(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        errors.check_required_field("tableName", &action.table_name);
        errors
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::DropTable(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let table = action.table_name.clone().unwrap_or_default();
        Ok(match lookup(scope, ObjectType::Table, &table)? {
            Some(_) => ActionStatus::incorrect(format!("Table '{table}' still exists")),
            None => ActionStatus::applied(),
        })
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::DropTable(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let table = inner.table_name.clone().unwrap_or_default();
        let cascade = if inner.cascade { " CASCADE" } else { "" };
        Ok(ActionResult::sql(format!(
            "DROP TABLE {}{cascade}",
            scope.database().qualify(&table)
        )))
    }
}
