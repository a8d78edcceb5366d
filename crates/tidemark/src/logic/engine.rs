//! The dispatch engine.

use tracing::{debug, warn};

use crate::action::{Action, ActionKind, ActionResult, ActionStatus, TerminalResult, ValidationErrors};
use crate::error::{Result, TidemarkError};
use crate::scope::Scope;

use super::{ActionLogic, LogicRegistry};

/// Options for the action engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// How many delegation steps may be taken before the catalog is
    /// considered to loop.
    pub max_delegation_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_delegation_depth: 32,
        }
    }
}

impl EngineOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum delegation depth.
    #[must_use]
    pub fn max_delegation_depth(mut self, depth: usize) -> Self {
        self.max_delegation_depth = depth;
        self
    }
}

/// Resolves actions to logic implementations and runs them.
#[derive(Debug)]
pub struct ActionEngine {
    registry: LogicRegistry,
    options: EngineOptions,
}

impl Default for ActionEngine {
    fn default() -> Self {
        Self::new(LogicRegistry::with_core_logic())
    }
}

impl ActionEngine {
    /// Creates an engine over a registry.
    #[must_use]
    pub fn new(registry: LogicRegistry) -> Self {
        Self {
            registry,
            options: EngineOptions::default(),
        }
    }

    /// Sets engine options.
    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &LogicRegistry {
        &self.registry
    }

    /// Selects the highest-priority logic for `kind` in `scope`.
    ///
    /// Fails with `NotSupported` when nothing matches and with
    /// `Configuration` when the top priority is shared.
    pub fn resolve(&self, kind: ActionKind, scope: &Scope) -> Result<&dyn ActionLogic> {
        let candidates = self.registry.candidates(kind, scope);
        let Some(top) = candidates.iter().map(|logic| logic.priority()).max() else {
            return Err(TidemarkError::NotSupported {
                action: kind.name().to_string(),
                database: scope.database().short_name().to_string(),
            });
        };

        let mut winners: Vec<&dyn ActionLogic> = candidates
            .into_iter()
            .filter(|logic| logic.priority() == top)
            .collect();
        if winners.len() > 1 {
            let mut names: Vec<&str> = winners.iter().map(|logic| logic.name()).collect();
            names.sort_unstable();
            return Err(TidemarkError::Configuration(format!(
                "{} logics share priority {top} for '{kind}' on {}: {}",
                names.len(),
                scope.database().short_name(),
                names.join(", ")
            )));
        }

        let logic = winners.remove(0);
        debug!(action = %kind, logic = logic.name(), priority = top, "Resolved logic");
        Ok(logic)
    }

    /// Validates an action, collecting every problem.
    pub fn validate(&self, action: &Action, scope: &Scope) -> Result<ValidationErrors> {
        let logic = self.resolve(action.kind(), scope)?;
        Ok(logic.validate(action, scope))
    }

    /// Checks whether the action's effect already holds.
    ///
    /// A failing status check is reported as an unknown status carrying the
    /// failure message. Only resolution errors are returned as `Err`.
    pub fn check_status(&self, action: &Action, scope: &Scope) -> Result<ActionStatus> {
        let logic = self.resolve(action.kind(), scope)?;
        match logic.check_status(action, scope) {
            Ok(status) => Ok(status),
            Err(e) => {
                warn!(action = %action, error = %e, "Status check failed");
                let reason = e.to_string();
                Ok(ActionStatus::unknown(if reason.is_empty() {
                    format!("status check failed for {action}")
                } else {
                    reason
                }))
            }
        }
    }

    /// Runs the resolved logic once without following delegation.
    pub fn execute_once(&self, action: &Action, scope: &Scope) -> Result<ActionResult> {
        let logic = self.resolve(action.kind(), scope)?;
        logic.execute(action, scope)
    }

    /// Executes an action, following delegation until only SQL remains.
    ///
    /// Statements are returned in delegation order.
    pub fn execute(&self, action: &Action, scope: &Scope) -> Result<TerminalResult> {
        let mut statements = Vec::new();
        self.expand(action, scope, 0, &mut statements)?;
        Ok(TerminalResult::new(statements))
    }

    fn expand(
        &self,
        action: &Action,
        scope: &Scope,
        depth: usize,
        statements: &mut Vec<String>,
    ) -> Result<()> {
        if depth > self.options.max_delegation_depth {
            return Err(TidemarkError::DelegationLoop {
                action: action.kind().name().to_string(),
                depth: self.options.max_delegation_depth,
            });
        }

        match self.execute_once(action, scope)? {
            ActionResult::Terminal(result) => {
                debug!(action = %action, statements = result.statements.len(), "Terminal result");
                statements.extend(result.statements);
            }
            ActionResult::Delegate(result) => {
                debug!(action = %action, delegates = result.actions.len(), depth, "Delegating");
                for delegate in &result.actions {
                    self.expand(delegate, scope, depth + 1, statements)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::ActionFamily;
    use crate::dialect::GenericDatabase;
    use crate::logic::{ActionMatch, PRIORITY_DEFAULT, PRIORITY_FALLBACK};

    struct Fixed {
        name: &'static str,
        matches: ActionMatch,
        priority: i32,
    }

    impl ActionLogic for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn supported_action(&self) -> ActionMatch {
            self.matches
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn execute(&self, _action: &Action, _scope: &Scope) -> Result<ActionResult> {
            Ok(ActionResult::sql(self.name))
        }
    }

    fn scope() -> Scope {
        Scope::new(Arc::new(GenericDatabase::new()))
    }

    #[test]
    fn test_exact_kind_beats_family_fallback() {
        let mut registry = LogicRegistry::new();
        registry
            .register(Fixed {
                name: "fallback",
                matches: ActionMatch::Family(ActionFamily::Sql),
                priority: PRIORITY_FALLBACK,
            })
            .register(Fixed {
                name: "exact",
                matches: ActionMatch::Kind(ActionKind::ExecuteSql),
                priority: PRIORITY_DEFAULT,
            });
        let engine = ActionEngine::new(registry);
        let logic = engine.resolve(ActionKind::ExecuteSql, &scope()).unwrap();
        assert_eq!(logic.name(), "exact");
    }

    #[test]
    fn test_no_candidate_is_not_supported() {
        let engine = ActionEngine::new(LogicRegistry::new());
        let err = engine
            .resolve(ActionKind::DropTable, &scope())
            .err()
            .unwrap();
        assert!(matches!(err, TidemarkError::NotSupported { .. }));
        assert_eq!(err.to_string(), "Action 'dropTable' is not supported on generic");
    }

    #[test]
    fn test_depth_zero_allows_only_terminal_logic() {
        let mut registry = LogicRegistry::new();
        registry.register(Fixed {
            name: "SELECT 1",
            matches: ActionMatch::Kind(ActionKind::ExecuteSql),
            priority: PRIORITY_DEFAULT,
        });
        let engine =
            ActionEngine::new(registry).with_options(EngineOptions::new().max_delegation_depth(0));
        let result = engine.execute(&Action::execute_sql("ignored"), &scope()).unwrap();
        assert_eq!(result.statements, vec!["SELECT 1".to_string()]);
    }
}
