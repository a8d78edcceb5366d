//! Applies actions against a connection.
//!
//! The runner validates an action, skips it when its effect already holds,
//! and otherwise hands the generated statements to the scope's connection.

use tracing::{debug, info, warn};

use crate::action::{Action, ActionStatus, Verdict};
use crate::error::{Result, TidemarkError};
use crate::logic::ActionEngine;
use crate::scope::Scope;

/// What happened to one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The effect was already present.
    Skipped(ActionStatus),
    /// Statements were generated, and executed unless in dry-run mode.
    Executed {
        /// The status found before execution.
        status: ActionStatus,
        /// Statements in execution order.
        statements: Vec<String>,
    },
}

impl RunOutcome {
    /// Returns the generated statements (empty when skipped).
    #[must_use]
    pub fn statements(&self) -> &[String] {
        match self {
            Self::Skipped(_) => &[],
            Self::Executed { statements, .. } => statements,
        }
    }
}

/// Runs actions through an engine.
#[derive(Debug)]
pub struct ActionRunner<'e> {
    engine: &'e ActionEngine,
    dry_run: bool,
}

impl<'e> ActionRunner<'e> {
    /// Creates a runner over an engine.
    #[must_use]
    pub fn new(engine: &'e ActionEngine) -> Self {
        Self {
            engine,
            dry_run: false,
        }
    }

    /// Enables dry-run mode (statements are collected but not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Applies a single action.
    pub fn run(&self, action: &Action, scope: &Scope) -> Result<RunOutcome> {
        info!(action = %action, "Applying action");

        let errors = self.engine.validate(action, scope)?;
        if errors.has_errors() {
            return Err(TidemarkError::Validation(errors));
        }

        let status = self.engine.check_status(action, scope)?;
        if status.is_applied() {
            warn!(action = %action, "Action already applied, skipping");
            return Ok(RunOutcome::Skipped(status));
        }
        if status.verdict() == Verdict::Unknown {
            debug!(action = %action, status = %status, "Status unknown, executing");
        }

        let result = self.engine.execute(action, scope)?;
        if !self.dry_run {
            let connection = scope.connection()?;
            for sql in &result.statements {
                debug!(sql = %sql, "Executing SQL");
                connection.execute(sql)?;
            }
        }

        info!(
            action = %action,
            statements = result.statements.len(),
            "Action applied successfully"
        );
        Ok(RunOutcome::Executed {
            status,
            statements: result.statements,
        })
    }

    /// Applies actions in order, stopping at the first failure.
    pub fn run_all(&self, actions: &[Action], scope: &Scope) -> Result<Vec<RunOutcome>> {
        actions.iter().map(|action| self.run(action, scope)).collect()
    }
}
