//! Per-attribute comparison of two objects.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::structure::{AttributeValue, ObjectReference, ObjectView};

/// An attribute value with object references replaced by catalog-relative
/// names, so values from different snapshots can be compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparedValue {
    /// Text scalar.
    Text(String),
    /// Integer scalar.
    Integer(i64),
    /// Boolean scalar.
    Boolean(bool),
    /// Reference to another object, by name relative to its catalog.
    Object(ObjectReference),
    /// Ordered collection.
    Collection(Vec<ComparedValue>),
}

impl ComparedValue {
    /// Resolves a value in the context of the object that holds it.
    #[must_use]
    pub fn resolve(value: &AttributeValue, owner: &ObjectView<'_>) -> Self {
        match value {
            AttributeValue::Text(s) => Self::Text(s.clone()),
            AttributeValue::Integer(i) => Self::Integer(*i),
            AttributeValue::Boolean(b) => Self::Boolean(*b),
            AttributeValue::Object(id) => Self::Object(
                owner
                    .snapshot()
                    .view(*id)
                    .map(|view| view.relative_reference())
                    .unwrap_or_default(),
            ),
            AttributeValue::Collection(items) => {
                Self::Collection(items.iter().map(|item| Self::resolve(item, owner)).collect())
            }
        }
    }

    /// Returns the integer if this is an integer scalar.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean scalar.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the text if this is a text scalar.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ComparedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Object(reference) => write!(f, "{reference}"),
            Self::Collection(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

/// The two sides of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    /// Value on the reference side.
    pub reference: Option<ComparedValue>,
    /// Value on the comparison side.
    pub comparison: Option<ComparedValue>,
}

impl Difference {
    /// Returns true if the sides disagree.
    #[must_use]
    pub fn is_different(&self) -> bool {
        self.reference != self.comparison
    }
}

/// Comparison results for every attribute either object carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectDifferences {
    attributes: BTreeMap<String, Difference>,
}

impl ObjectDifferences {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares two objects attribute by attribute.
    #[must_use]
    pub fn compare(reference: &ObjectView<'_>, comparison: &ObjectView<'_>) -> Self {
        let mut differences = Self::new();
        for &attribute in reference.object_type().attributes() {
            let left = reference.get(attribute).map(|v| ComparedValue::resolve(v, reference));
            let right = comparison
                .get(attribute)
                .map(|v| ComparedValue::resolve(v, comparison));
            if left.is_some() || right.is_some() {
                differences.record(attribute, left, right);
            }
        }
        differences
    }

    /// Records the two sides of an attribute.
    pub fn record(
        &mut self,
        attribute: impl Into<String>,
        reference: Option<ComparedValue>,
        comparison: Option<ComparedValue>,
    ) -> &mut Self {
        self.attributes.insert(
            attribute.into(),
            Difference {
                reference,
                comparison,
            },
        );
        self
    }

    /// Returns the comparison of one attribute.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&Difference> {
        self.attributes.get(attribute)
    }

    /// Returns true if the attribute was compared and differs.
    #[must_use]
    pub fn is_different(&self, attribute: &str) -> bool {
        self.get(attribute).is_some_and(Difference::is_different)
    }

    /// Returns true if any attribute differs.
    #[must_use]
    pub fn has_differences(&self) -> bool {
        self.attributes.values().any(Difference::is_different)
    }

    /// Iterates over the differing attributes in name order.
    pub fn changed(&self) -> impl Iterator<Item = (&str, &Difference)> {
        self.attributes
            .iter()
            .filter(|(_, d)| d.is_different())
            .map(|(name, d)| (name.as_str(), d))
    }
}
