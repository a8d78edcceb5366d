//! Accumulating validation results.

use std::fmt;

use crate::error::{Result, TidemarkError};
use crate::structure::ObjectReference;
use crate::types::DataType;

/// Values that can be missing from an action.
pub trait Required {
    /// Returns true if the value counts as supplied.
    fn is_present(&self) -> bool;
}

impl Required for String {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Required for ObjectReference {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Required for DataType {
    fn is_present(&self) -> bool {
        true
    }
}

impl Required for i64 {
    fn is_present(&self) -> bool {
        true
    }
}

impl<T> Required for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Required> Required for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(Required::is_present)
    }
}

/// Every problem found while validating one action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<String>,
}

impl ValidationErrors {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error.
    pub fn add(&mut self, message: impl Into<String>) -> &mut Self {
        self.errors.push(message.into());
        self
    }

    /// Records `<field> is required` when the value is missing.
    pub fn check_required_field(&mut self, field: &str, value: &impl Required) -> &mut Self {
        if !value.is_present() {
            self.add(format!("{field} is required"));
        }
        self
    }

    /// Records `message` when `condition` does not hold.
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.add(message);
        }
        self
    }

    /// Appends every error from another result.
    pub fn extend(&mut self, other: Self) -> &mut Self {
        self.errors.extend(other.errors);
        self
    }

    /// Returns true if any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the recorded messages in order.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Converts into `Err(TidemarkError::Validation)` when errors exist.
    pub fn into_result(self) -> Result<()> {
        if self.has_errors() {
            Err(TidemarkError::Validation(self))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.errors.iter().map(|e| format!("  - {e}")).collect();
        f.write_str(&lines.join("\n"))
    }
}
