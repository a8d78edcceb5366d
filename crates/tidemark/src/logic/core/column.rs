//! Column logics.

use crate::action::{
    Action, ActionKind, ActionResult, ActionStatus, Clauses, ValidationErrors,
};
use crate::error::Result;
use crate::logic::{unexpected_action, unexpected_action_errors, ActionLogic, ActionMatch};
use crate::scope::Scope;
use crate::structure::{ObjectReference, ObjectType};
use crate::types::DataType;

use super::{check_column_name, column_definition, lookup, split_column};

/// Renders `ALTER TABLE <t> ALTER COLUMN <c> <clauses>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlterColumnLogic;

impl ActionLogic for AlterColumnLogic {
    fn name(&self) -> &'static str {
        "AlterColumnLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::AlterColumn)
    }

    fn supports_scope(&self, scope: &Scope) -> bool {
        scope.database().supports_alter_column()
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::AlterColumn(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        check_column_name(&mut errors, "columnName", action.column_name.as_ref());
        errors.check(!action.clauses.is_empty(), "clauses is required");
        errors
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::AlterColumn(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let column = inner.column_name.clone().unwrap_or_default();
        let (table, name) = split_column(scope, &column);
        Ok(ActionResult::sql(format!(
            "ALTER TABLE {table} ALTER COLUMN {} {}",
            scope.database().quote_identifier(name),
            inner.clauses
        )))
    }
}

/// Renders `ALTER TABLE <t> ADD COLUMN <definition>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddColumnLogic;

impl ActionLogic for AddColumnLogic {
    fn name(&self) -> &'static str {
        "AddColumnLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::AddColumn)
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::AddColumn(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        errors.check_required_field("tableName", &action.table_name);
        errors.check_required_field("columnName", &action.column.name);
        errors
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::AddColumn(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let table = action.table_name.clone().unwrap_or_default();
        let column = ObjectReference::new(
            table
                .as_list()
                .iter()
                .cloned()
                .chain(std::iter::once(action.column.name.clone())),
        );
        Ok(match lookup(scope, ObjectType::Column, &column)? {
            Some(_) => ActionStatus::applied(),
            None => ActionStatus::incorrect(format!("Column '{column}' does not exist")),
        })
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::AddColumn(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let table = inner.table_name.clone().unwrap_or_default();
        Ok(ActionResult::sql(format!(
            "ALTER TABLE {} ADD COLUMN {}",
            scope.database().qualify(&table),
            column_definition(scope, &inner.column)
        )))
    }
}

/// Renders `ALTER TABLE <t> DROP COLUMN <c>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropColumnLogic;

impl ActionLogic for DropColumnLogic {
    fn name(&self) -> &'static str {
        "DropColumnLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::DropColumn)
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::DropColumn(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        check_column_name(&mut errors, "columnName", action.column_name.as_ref());
        errors
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::DropColumn(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let column = action.column_name.clone().unwrap_or_default();
        Ok(match lookup(scope, ObjectType::Column, &column)? {
            Some(_) => ActionStatus::incorrect(format!("Column '{column}' still exists")),
            None => ActionStatus::applied(),
        })
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::DropColumn(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let column = inner.column_name.clone().unwrap_or_default();
        let (table, name) = split_column(scope, &column);
        Ok(ActionResult::sql(format!(
            "ALTER TABLE {table} DROP COLUMN {}",
            scope.database().quote_identifier(name)
        )))
    }
}

/// Delegates a type change to ALTER COLUMN.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifyDataTypeLogic;

impl ActionLogic for ModifyDataTypeLogic {
    fn name(&self) -> &'static str {
        "ModifyDataTypeLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::ModifyDataType)
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::ModifyDataType(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        check_column_name(&mut errors, "columnName", action.column_name.as_ref());
        errors.check_required_field("newDataType", &action.new_data_type);
        errors
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::ModifyDataType(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let column_name = action.column_name.clone().unwrap_or_default();
        let Some(column) = lookup(scope, ObjectType::Column, &column_name)? else {
            return Ok(ActionStatus::unknown(format!(
                "Column '{column_name}' does not exist"
            )));
        };
        let current = column
            .get("type")
            .and_then(|v| v.as_text())
            .map(|t| t.parse::<DataType>());
        let matches = match (current, &action.new_data_type) {
            (Some(Ok(current)), Some(wanted)) => current == *wanted,
            _ => false,
        };
        Ok(ActionStatus::applied().assert_correct(
            matches,
            format!("Column '{column_name}' has a different type"),
        ))
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::ModifyDataType(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let clauses = Clauses::new().with_optional(
            "dataType",
            inner
                .new_data_type
                .as_ref()
                .map(|t| format!("SET DATA TYPE {}", scope.type_sql(t))),
        );
        Ok(ActionResult::delegate([Action::alter_column(
            inner.column_name.clone().unwrap_or_default(),
            clauses,
        )]))
    }
}

/// Delegates NOT NULL changes to ALTER COLUMN.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetNullableLogic;

impl ActionLogic for SetNullableLogic {
    fn name(&self) -> &'static str {
        "SetNullableLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::SetNullable)
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::SetNullable(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        check_column_name(&mut errors, "columnName", action.column_name.as_ref());
        errors
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::SetNullable(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let column_name = action.column_name.clone().unwrap_or_default();
        let Some(column) = lookup(scope, ObjectType::Column, &column_name)? else {
            return Ok(ActionStatus::unknown(format!(
                "Column '{column_name}' does not exist"
            )));
        };
        let nullable = column.get("nullable").and_then(|v| v.as_bool());
        Ok(ActionStatus::applied().assert_correct(
            nullable == Some(action.nullable),
            format!("Column '{column_name}' has a different nullability"),
        ))
    }

    fn execute(&self, action: &Action, _scope: &Scope) -> Result<ActionResult> {
        let Action::SetNullable(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let clause = if inner.nullable {
            "DROP NOT NULL"
        } else {
            "SET NOT NULL"
        };
        Ok(ActionResult::delegate([Action::alter_column(
            inner.column_name.clone().unwrap_or_default(),
            Clauses::new().with("nullable", clause),
        )]))
    }
}

/// Delegates default changes to ALTER COLUMN.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetDefaultValueLogic;

impl ActionLogic for SetDefaultValueLogic {
    fn name(&self) -> &'static str {
        "SetDefaultValueLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::SetDefaultValue)
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::SetDefaultValue(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        check_column_name(&mut errors, "columnName", action.column_name.as_ref());
        errors
    }

    fn execute(&self, action: &Action, _scope: &Scope) -> Result<ActionResult> {
        let Action::SetDefaultValue(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let clause = match &inner.default_value {
            Some(value) => format!("SET DEFAULT {value}"),
            None => "DROP DEFAULT".to_string(),
        };
        Ok(ActionResult::delegate([Action::alter_column(
            inner.column_name.clone().unwrap_or_default(),
            Clauses::new().with("defaultValue", clause),
        )]))
    }
}
