//! Auto-increment logics.

use crate::action::{
    Action, ActionKind, ActionResult, ActionStatus, AddAutoIncrementAction, Clauses,
    ValidationErrors,
};
use crate::error::Result;
use crate::logic::{
    unexpected_action, unexpected_action_errors, ActionLogic, ActionMatch, PRIORITY_SPECIALIZED,
};
use crate::scope::Scope;
use crate::structure::ObjectType;

/// Rewrites auto-increment into an ALTER COLUMN with identity clauses.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddAutoIncrementLogic;

impl AddAutoIncrementLogic {
    /// Builds the `dataType` and `autoIncrement` clauses for an action.
    #[must_use]
    pub fn clauses(action: &AddAutoIncrementAction, scope: &Scope) -> Clauses {
        Clauses::new()
            .with_optional(
                "dataType",
                action.column_data_type.as_ref().map(|t| scope.type_sql(t)),
            )
            .with("autoIncrement", identity_clause(action, scope))
    }
}

/// `GENERATED BY DEFAULT AS IDENTITY` with optional `(START WITH .. INCREMENT BY ..)`.
fn identity_clause(action: &AddAutoIncrementAction, scope: &Scope) -> Clauses {
    let details = Clauses::delimited("(", " ", ")")
        .with_optional("startWith", action.start_with.map(|n| format!("START WITH {n}")))
        .with_optional(
            "incrementBy",
            action.increment_by.map(|n| format!("INCREMENT BY {n}")),
        );
    Clauses::new()
        .with("marker", scope.database().auto_increment_clause())
        .with("details", details)
}

fn validate_action(action: &AddAutoIncrementAction) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check_required_field("columnName", &action.column_name);
    errors.check_required_field("columnDataType", &action.column_data_type);
    if !errors.has_errors() {
        super::check_column_name(&mut errors, "columnName", action.column_name.as_ref());
    }
    errors
}

fn status_of(action: &AddAutoIncrementAction, scope: &Scope) -> Result<ActionStatus> {
    let Some(column_name) = &action.column_name else {
        return Ok(ActionStatus::unknown("columnName is not set"));
    };
    let Some(column) = super::lookup(scope, ObjectType::Column, column_name)? else {
        return Ok(ActionStatus::unknown(format!(
            "Column '{column_name}' does not exist"
        )));
    };
    let auto_increment = column
        .get("autoIncrement")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    Ok(ActionStatus::applied().assert_correct(
        auto_increment,
        format!("Column '{column_name}' is not auto-increment"),
    ))
}

impl ActionLogic for AddAutoIncrementLogic {
    fn name(&self) -> &'static str {
        "AddAutoIncrementLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::AddAutoIncrement)
    }

    fn supports_scope(&self, scope: &Scope) -> bool {
        scope.database().supports_auto_increment()
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        match action {
            Action::AddAutoIncrement(action) => validate_action(action),
            other => unexpected_action_errors(self.name(), other),
        }
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::AddAutoIncrement(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        status_of(action, scope)
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::AddAutoIncrement(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let column = inner.column_name.clone().unwrap_or_default();
        Ok(ActionResult::delegate([Action::alter_column(
            column,
            Self::clauses(inner, scope),
        )]))
    }
}

/// PostgreSQL cannot change the type and add identity in one clause list,
/// so the alteration is split into two statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddAutoIncrementPostgresLogic;

impl ActionLogic for AddAutoIncrementPostgresLogic {
    fn name(&self) -> &'static str {
        "AddAutoIncrementPostgresLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::AddAutoIncrement)
    }

    fn priority(&self) -> i32 {
        PRIORITY_SPECIALIZED
    }

    fn supports_scope(&self, scope: &Scope) -> bool {
        scope.database().short_name() == "postgresql"
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        match action {
            Action::AddAutoIncrement(action) => validate_action(action),
            other => unexpected_action_errors(self.name(), other),
        }
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::AddAutoIncrement(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        status_of(action, scope)
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::AddAutoIncrement(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let column = inner.column_name.clone().unwrap_or_default();
        let mut actions = Vec::with_capacity(2);
        if let Some(data_type) = &inner.column_data_type {
            actions.push(Action::alter_column(
                column.clone(),
                Clauses::new().with("dataType", format!("TYPE {}", scope.type_sql(data_type))),
            ));
        }
        let identity = identity_clause(inner, scope).prepend("add", "ADD");
        actions.push(Action::alter_column(
            column,
            Clauses::new().with("autoIncrement", identity),
        ));
        Ok(ActionResult::delegate(actions))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dialect::{GenericDatabase, PostgresDatabase};
    use crate::types::DataType;

    #[test]
    fn test_identity_details() {
        let scope = Scope::new(Arc::new(GenericDatabase::new()));
        let action = AddAutoIncrementAction {
            column_name: Some("APP.USER.ID".parse().unwrap()),
            column_data_type: Some(DataType::BigInt),
            start_with: Some(100),
            increment_by: None,
        };
        let clauses = AddAutoIncrementLogic::clauses(&action, &scope);
        assert_eq!(
            clauses.render(),
            "BIGINT GENERATED BY DEFAULT AS IDENTITY (START WITH 100)"
        );
    }

    #[test]
    fn test_postgres_splits_type_and_identity() {
        let scope = Scope::new(Arc::new(PostgresDatabase::new()));
        let action = Action::add_auto_increment("APP.USER.ID", DataType::BigInt);
        let result = AddAutoIncrementPostgresLogic.execute(&action, &scope).unwrap();
        let delegated = result.delegated().unwrap();
        assert_eq!(delegated.len(), 2);
        let Action::AlterColumn(second) = &delegated[1] else {
            panic!("expected alter column, got {:?}", delegated[1]);
        };
        assert_eq!(
            second.clauses.render(),
            "ADD GENERATED BY DEFAULT AS IDENTITY"
        );
    }

    #[test]
    fn test_short_reference_needs_table() {
        let scope = Scope::new(Arc::new(GenericDatabase::new()));
        let action = Action::add_auto_increment("ID", DataType::Integer);
        let errors = AddAutoIncrementLogic.validate(&action, &scope);
        assert_eq!(errors.errors(), ["Table name is required"]);
    }
}
