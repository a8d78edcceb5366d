//! Sequence logics.

use crate::action::{
    Action, ActionKind, ActionResult, ActionStatus, Clauses, SequenceSettings, ValidationErrors,
};
use crate::error::Result;
use crate::logic::{unexpected_action, unexpected_action_errors, ActionLogic, ActionMatch};
use crate::scope::Scope;
use crate::structure::{DatabaseObject, ObjectType};

use super::lookup;

fn settings_clauses(settings: &SequenceSettings) -> Clauses {
    Clauses::new()
        .with_optional("incrementBy", settings.increment_by.map(|n| format!("INCREMENT BY {n}")))
        .with_optional("minValue", settings.min_value.map(|n| format!("MINVALUE {n}")))
        .with_optional("maxValue", settings.max_value.map(|n| format!("MAXVALUE {n}")))
        .with_optional("cacheSize", settings.cache_size.map(|n| format!("CACHE {n}")))
        .with_optional(
            "willCycle",
            settings.will_cycle.map(|c| if c { "CYCLE" } else { "NO CYCLE" }),
        )
        .with_optional(
            "ordered",
            settings.ordered.map(|o| if o { "ORDER" } else { "NO ORDER" }),
        )
}

/// Compares every requested setting against a captured sequence.
fn settings_status(sequence: &DatabaseObject, settings: &SequenceSettings) -> ActionStatus {
    let integer = |name: &str| sequence.get(name).and_then(|v| v.as_integer());
    let boolean = |name: &str| sequence.get(name).and_then(|v| v.as_bool());
    let mut status = ActionStatus::applied();
    let checks = [
        ("incrementBy", settings.increment_by.map(|v| integer("incrementBy") == Some(v))),
        ("minValue", settings.min_value.map(|v| integer("minValue") == Some(v))),
        ("maxValue", settings.max_value.map(|v| integer("maxValue") == Some(v))),
        ("cacheSize", settings.cache_size.map(|v| integer("cacheSize") == Some(v))),
        ("willCycle", settings.will_cycle.map(|v| boolean("willCycle") == Some(v))),
        ("ordered", settings.ordered.map(|v| boolean("ordered") == Some(v))),
    ];
    for (name, holds) in checks {
        if let Some(holds) = holds {
            status = status.assert_correct(holds, format!("{name} differs"));
        }
    }
    status
}

/// Renders `CREATE SEQUENCE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateSequenceLogic;

impl ActionLogic for CreateSequenceLogic {
    fn name(&self) -> &'static str {
        "CreateSequenceLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::CreateSequence)
    }

    fn supports_scope(&self, scope: &Scope) -> bool {
        scope.database().supports_sequences()
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::CreateSequence(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        errors.check_required_field("sequenceName", &action.sequence_name);
        errors
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::CreateSequence(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let name = action.sequence_name.clone().unwrap_or_default();
        Ok(match lookup(scope, ObjectType::Sequence, &name)? {
            Some(sequence) => settings_status(&sequence, &action.settings),
            None => ActionStatus::incorrect(format!("Sequence '{name}' does not exist")),
        })
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::CreateSequence(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let name = inner.sequence_name.clone().unwrap_or_default();
        let clauses = Clauses::new()
            .with("name", scope.database().qualify(&name))
            .with_optional("startValue", inner.start_value.map(|n| format!("START WITH {n}")))
            .with("settings", settings_clauses(&inner.settings));
        Ok(ActionResult::sql(format!("CREATE SEQUENCE {clauses}")))
    }
}

/// Renders `ALTER SEQUENCE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlterSequenceLogic;

impl ActionLogic for AlterSequenceLogic {
    fn name(&self) -> &'static str {
        "AlterSequenceLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::AlterSequence)
    }

    fn supports_scope(&self, scope: &Scope) -> bool {
        scope.database().supports_sequences()
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::AlterSequence(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        errors.check_required_field("sequenceName", &action.sequence_name);
        errors.check(!action.settings.is_empty(), "No sequence settings to alter");
        errors
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::AlterSequence(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let name = action.sequence_name.clone().unwrap_or_default();
        Ok(match lookup(scope, ObjectType::Sequence, &name)? {
            Some(sequence) => settings_status(&sequence, &action.settings),
            None => ActionStatus::unknown(format!("Sequence '{name}' does not exist")),
        })
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::AlterSequence(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let name = inner.sequence_name.clone().unwrap_or_default();
        Ok(ActionResult::sql(format!(
            "ALTER SEQUENCE {} {}",
            scope.database().qualify(&name),
            settings_clauses(&inner.settings)
        )))
    }
}

/// Renders `DROP SEQUENCE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropSequenceLogic;

impl ActionLogic for DropSequenceLogic {
    fn name(&self) -> &'static str {
        "DropSequenceLogic"
    }

    fn supported_action(&self) -> ActionMatch {
        ActionMatch::Kind(ActionKind::DropSequence)
    }

    fn supports_scope(&self, scope: &Scope) -> bool {
        scope.database().supports_sequences()
    }

    fn validate(&self, action: &Action, _scope: &Scope) -> ValidationErrors {
        let Action::DropSequence(action) = action else {
            return unexpected_action_errors(self.name(), action);
        };
        let mut errors = ValidationErrors::new();
        errors.check_required_field("sequenceName", &action.sequence_name);
        errors
    }

    fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let Action::DropSequence(action) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let name = action.sequence_name.clone().unwrap_or_default();
        Ok(match lookup(scope, ObjectType::Sequence, &name)? {
            Some(_) => ActionStatus::incorrect(format!("Sequence '{name}' still exists")),
            None => ActionStatus::applied(),
        })
    }

    fn execute(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let Action::DropSequence(inner) = action else {
            return Err(unexpected_action(self.name(), action));
        };
        let name = inner.sequence_name.clone().unwrap_or_default();
        Ok(ActionResult::sql(format!(
            "DROP SEQUENCE {}",
            scope.database().qualify(&name)
        )))
    }
}
