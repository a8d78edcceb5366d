//! Labeled SQL fragments.
//!
//! [`Clauses`] is an ordered, immutable list of labeled fragments. Logics
//! build it up by value and render it once at the end. Clauses that render
//! empty, including nested ones, are dropped along with their delimiters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of a [`Clauses`] list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Clause {
    /// A literal fragment.
    Text(String),
    /// A nested list rendered in place.
    Nested(Clauses),
}

impl Clause {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Nested(clauses) => clauses.render(),
        }
    }
}

impl From<&str> for Clause {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Clause {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Clauses> for Clause {
    fn from(value: Clauses) -> Self {
        Self::Nested(value)
    }
}

/// Ordered labeled fragments with optional delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clauses {
    start: Option<String>,
    separator: String,
    end: Option<String>,
    entries: Vec<(String, Clause)>,
}

impl Default for Clauses {
    fn default() -> Self {
        Self::new()
    }
}

impl Clauses {
    /// Creates an empty list joined by single spaces.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: None,
            separator: " ".to_string(),
            end: None,
            entries: Vec::new(),
        }
    }

    /// Creates an empty list rendered as `start` + entries + `end`.
    #[must_use]
    pub fn delimited(start: &str, separator: &str, end: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            separator: separator.to_string(),
            end: Some(end.to_string()),
            entries: Vec::new(),
        }
    }

    /// Appends a labeled clause. An existing clause with the same label is
    /// replaced in place.
    #[must_use]
    pub fn with(mut self, label: impl Into<String>, clause: impl Into<Clause>) -> Self {
        let label = label.into();
        let clause = clause.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = clause,
            None => self.entries.push((label, clause)),
        }
        self
    }

    /// Appends a labeled clause only when a value is present.
    #[must_use]
    pub fn with_optional<C: Into<Clause>>(self, label: &str, clause: Option<C>) -> Self {
        match clause {
            Some(clause) => self.with(label, clause),
            None => self,
        }
    }

    /// Inserts a labeled clause at the front.
    #[must_use]
    pub fn prepend(mut self, label: impl Into<String>, clause: impl Into<Clause>) -> Self {
        let label = label.into();
        self.entries.retain(|(l, _)| *l != label);
        self.entries.insert(0, (label, clause.into()));
        self
    }

    /// Removes a labeled clause.
    #[must_use]
    pub fn without(mut self, label: &str) -> Self {
        self.entries.retain(|(l, _)| l != label);
        self
    }

    /// Returns a clause by label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Clause> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, clause)| clause)
    }

    /// Returns the rendered text of a clause, if present and non-empty.
    #[must_use]
    pub fn text(&self, label: &str) -> Option<String> {
        self.get(label)
            .map(Clause::render)
            .filter(|text| !text.is_empty())
    }

    /// Returns the labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Returns true if the list renders to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.render().is_empty()
    }

    /// Renders the list, dropping empty fragments.
    #[must_use]
    pub fn render(&self) -> String {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(_, clause)| clause.render())
            .filter(|text| !text.is_empty())
            .collect();
        if parts.is_empty() {
            return String::new();
        }
        format!(
            "{}{}{}",
            self.start.as_deref().unwrap_or(""),
            parts.join(&self.separator),
            self.end.as_deref().unwrap_or("")
        )
    }
}

impl fmt::Display for Clauses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_delimiters() {
        let details = Clauses::delimited("(", " ", ")")
            .with("startWith", "START WITH 5")
            .with("incrementBy", "INCREMENT BY 2");
        let clauses = Clauses::new()
            .with("marker", "GENERATED BY DEFAULT AS IDENTITY")
            .with("details", details);
        assert_eq!(
            clauses.render(),
            "GENERATED BY DEFAULT AS IDENTITY (START WITH 5 INCREMENT BY 2)"
        );
    }

    #[test]
    fn test_empty_nested_clause_vanishes() {
        let clauses = Clauses::new()
            .with("marker", "IDENTITY")
            .with("details", Clauses::delimited("(", ", ", ")"))
            .with("blank", "  ");
        assert_eq!(clauses.render(), "IDENTITY");
        assert_eq!(clauses.text("details"), None);
        assert!(Clauses::delimited("(", ",", ")").is_empty());
    }

    #[test]
    fn test_with_replaces_and_prepend_reorders() {
        let clauses = Clauses::new()
            .with("a", "A")
            .with("b", "B")
            .with("a", "A2")
            .prepend("b", "B2");
        assert_eq!(clauses.labels().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(clauses.render(), "B2 A2");
        assert_eq!(clauses.without("b").render(), "A2");
    }
}
