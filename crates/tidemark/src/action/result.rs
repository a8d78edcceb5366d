//! Outcomes of executing an action.

use serde::{Deserialize, Serialize};

use super::Action;

/// SQL ready to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalResult {
    /// Statements in execution order.
    pub statements: Vec<String>,
}

impl TerminalResult {
    /// Creates a result from statements.
    #[must_use]
    pub fn new(statements: Vec<String>) -> Self {
        Self { statements }
    }
}

/// Replacement actions that must be resolved in turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegateResult {
    /// Actions to resolve, in order.
    pub actions: Vec<Action>,
}

/// Outcome of one logic's `execute` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionResult {
    /// Dialect SQL ready to run.
    Terminal(TerminalResult),
    /// Forwarding to more primitive actions.
    Delegate(DelegateResult),
}

impl ActionResult {
    /// A terminal result with a single statement.
    #[must_use]
    pub fn sql(statement: impl Into<String>) -> Self {
        Self::Terminal(TerminalResult::new(vec![statement.into()]))
    }

    /// A delegate result wrapping the given actions.
    #[must_use]
    pub fn delegate(actions: impl IntoIterator<Item = Action>) -> Self {
        Self::Delegate(DelegateResult {
            actions: actions.into_iter().collect(),
        })
    }

    /// Returns the delegated actions, if this is a delegate result.
    #[must_use]
    pub fn delegated(&self) -> Option<&[Action]> {
        match self {
            Self::Delegate(result) => Some(&result.actions),
            Self::Terminal(_) => None,
        }
    }
}
