//! Idempotency verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether an action's effect already holds in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The effect could not be determined. Callers must neither skip nor
    /// assume the action is needed.
    Unknown,
    /// The effect is already present.
    Applied,
    /// The effect is absent or differs from what the action describes.
    Incorrect,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Applied => write!(f, "applied"),
            Self::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// A verdict with the reasons that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStatus {
    verdict: Verdict,
    reasons: Vec<String>,
}

impl ActionStatus {
    /// The effect is already present.
    #[must_use]
    pub fn applied() -> Self {
        Self {
            verdict: Verdict::Applied,
            reasons: Vec::new(),
        }
    }

    /// The effect could not be determined.
    #[must_use]
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Unknown,
            reasons: vec![reason.into()],
        }
    }

    /// The effect is absent or wrong.
    #[must_use]
    pub fn incorrect(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Incorrect,
            reasons: vec![reason.into()],
        }
    }

    /// Downgrades an applied status to incorrect when `holds` is false.
    /// An unknown status stays unknown but keeps the reason.
    #[must_use]
    pub fn assert_correct(mut self, holds: bool, reason: impl Into<String>) -> Self {
        if !holds {
            if self.verdict == Verdict::Applied {
                self.verdict = Verdict::Incorrect;
            }
            self.reasons.push(reason.into());
        }
        self
    }

    /// Returns the verdict.
    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Returns true if the effect is already present.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.verdict == Verdict::Applied
    }

    /// Returns the reasons in the order they were found.
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reasons.is_empty() {
            write!(f, "{}", self.verdict)
        } else {
            write!(f, "{}: {}", self.verdict, self.reasons.join("; "))
        }
    }
}
