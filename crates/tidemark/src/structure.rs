//! The snapshot object graph.
//!
//! A [`DatabaseObject`] is one node of a captured schema. Nodes never hold
//! pointers to each other: container links and attribute references are
//! [`SnapshotId`]s resolved through the owning
//! [`DatabaseSnapshot`](crate::snapshot::DatabaseSnapshot). An
//! [`ObjectView`] pairs a node with its snapshot so callers can walk the
//! graph without juggling ids.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::snapshot::DatabaseSnapshot;

/// Opaque identity assigned when an object is created in a snapshot pass.
///
/// Two objects are the same node only if their ids match; structural
/// equality says nothing about identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(u64);

impl SnapshotId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of object kinds a snapshot may contain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ObjectType {
    /// A catalog (database-level container).
    Catalog,
    /// A schema inside a catalog.
    Schema,
    /// A table.
    Table,
    /// A view.
    View,
    /// A column of a table or view.
    Column,
    /// A sequence.
    Sequence,
    /// An index on a table.
    Index,
    /// A primary key constraint.
    PrimaryKey,
    /// A foreign key constraint.
    ForeignKey,
    /// A unique constraint.
    UniqueConstraint,
}

impl ObjectType {
    /// Every object type, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Catalog,
        Self::Schema,
        Self::Table,
        Self::View,
        Self::Column,
        Self::Sequence,
        Self::Index,
        Self::PrimaryKey,
        Self::ForeignKey,
        Self::UniqueConstraint,
    ];

    /// Returns the display name of this type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Catalog => "Catalog",
            Self::Schema => "Schema",
            Self::Table => "Table",
            Self::View => "View",
            Self::Column => "Column",
            Self::Sequence => "Sequence",
            Self::Index => "Index",
            Self::PrimaryKey => "PrimaryKey",
            Self::ForeignKey => "ForeignKey",
            Self::UniqueConstraint => "UniqueConstraint",
        }
    }

    /// The attribute names objects of this type may carry.
    #[must_use]
    pub const fn attributes(self) -> &'static [&'static str] {
        match self {
            Self::Catalog => &["default"],
            Self::Schema => &["catalog", "default"],
            Self::Table => &[
                "schema",
                "columns",
                "primaryKey",
                "indexes",
                "uniqueConstraints",
                "outgoingForeignKeys",
                "remarks",
                "tablespace",
            ],
            Self::View => &["schema", "columns", "definition", "remarks"],
            Self::Column => &[
                "relation",
                "type",
                "nullable",
                "defaultValue",
                "autoIncrement",
                "startWith",
                "incrementBy",
                "order",
                "remarks",
            ],
            Self::Sequence => &[
                "schema",
                "dataType",
                "startValue",
                "incrementBy",
                "minValue",
                "maxValue",
                "ordered",
                "cacheSize",
                "willCycle",
            ],
            Self::Index => &["relation", "columns", "unique"],
            Self::PrimaryKey => &["table", "columns", "backingIndex"],
            Self::ForeignKey => &[
                "foreignKeyTable",
                "foreignKeyColumns",
                "primaryKeyTable",
                "primaryKeyColumns",
                "deleteRule",
                "updateRule",
            ],
            Self::UniqueConstraint => &["table", "columns"],
        }
    }

    /// The types an object of this type may be contained by.
    ///
    /// An empty slice means the type sits at the top of the hierarchy.
    #[must_use]
    pub const fn container_types(self) -> &'static [Self] {
        match self {
            Self::Catalog => &[],
            Self::Schema => &[Self::Catalog],
            Self::Table | Self::View | Self::Sequence => &[Self::Schema],
            Self::Column => &[Self::Table, Self::View],
            Self::Index | Self::PrimaryKey | Self::ForeignKey | Self::UniqueConstraint => {
                &[Self::Table]
            }
        }
    }

    /// Returns true if `attribute` is declared for this type.
    #[must_use]
    pub fn has_attribute(self, attribute: &str) -> bool {
        self.attributes().contains(&attribute)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown object type '{s}'"))
    }
}

/// The value of one named attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeValue {
    /// Text scalar.
    Text(String),
    /// Integer scalar.
    Integer(i64),
    /// Boolean scalar.
    Boolean(bool),
    /// Reference to another object in the same snapshot.
    Object(SnapshotId),
    /// Ordered collection of values.
    Collection(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Returns the referenced id if this is an object reference.
    #[must_use]
    pub const fn as_object(&self) -> Option<SnapshotId> {
        match self {
            Self::Object(id) => Some(*id),
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

    /// Returns true for scalars (not references or collections).
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Integer(_) | Self::Boolean(_))
    }

    /// Calls `f` for every object id referenced by this value.
    pub fn for_each_reference(&self, f: &mut impl FnMut(SnapshotId)) {
        match self {
            Self::Object(id) => f(*id),
            Self::Collection(items) => {
                for item in items {
                    item.for_each_reference(f);
                }
            }
            Self::Text(_) | Self::Integer(_) | Self::Boolean(_) => {}
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<SnapshotId> for AttributeValue {
    fn from(value: SnapshotId) -> Self {
        Self::Object(value)
    }
}

/// One node of the snapshot graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseObject {
    /// Identity within the owning snapshot.
    pub id: SnapshotId,
    /// The object's type.
    pub object_type: ObjectType,
    /// Object name.
    pub name: String,
    /// The containing object, following the strict
    /// object → schema → catalog hierarchy.
    pub container: Option<SnapshotId>,
    /// Named attribute values, restricted to the type's declared schema.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl DatabaseObject {
    /// Returns an attribute value by name.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get(attribute)
    }

    /// Returns the names of attributes that carry a value, sorted.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

/// A dotted, possibly partial, qualified name such as `APP.USER.ID`.
///
/// Segments run from the outermost container to the object itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectReference {
    parts: Vec<String>,
}

impl ObjectReference {
    /// Creates a reference from its segments.
    #[must_use]
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the segments, outermost first.
    #[must_use]
    pub fn as_list(&self) -> &[String] {
        &self.parts
    }

    /// Returns the object's own name (the last segment).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// Returns the reference to the container (all but the last segment).
    #[must_use]
    pub fn container(&self) -> Option<Self> {
        if self.parts.len() < 2 {
            return None;
        }
        Some(Self {
            parts: self.parts[..self.parts.len() - 1].to_vec(),
        })
    }

    /// Returns true if there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

impl FromStr for ObjectReference {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(
            s.split('.').map(str::trim).filter(|p| !p.is_empty()),
        ))
    }
}

/// A borrowed handle on an object together with the snapshot that owns it.
#[derive(Debug, Clone, Copy)]
pub struct ObjectView<'a> {
    snapshot: &'a DatabaseSnapshot,
    object: &'a DatabaseObject,
}

impl<'a> ObjectView<'a> {
    pub(crate) const fn new(snapshot: &'a DatabaseSnapshot, object: &'a DatabaseObject) -> Self {
        Self { snapshot, object }
    }

    /// Returns the underlying object.
    #[must_use]
    pub const fn object(&self) -> &'a DatabaseObject {
        self.object
    }

    /// Returns the owning snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &'a DatabaseSnapshot {
        self.snapshot
    }

    /// Returns the object's identity.
    #[must_use]
    pub const fn id(&self) -> SnapshotId {
        self.object.id
    }

    /// Returns the object's type.
    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        self.object.object_type
    }

    /// Returns the object's name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.object.name
    }

    /// Returns an attribute value by name.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&'a AttributeValue> {
        self.object.attributes.get(attribute)
    }

    /// Resolves an object-valued attribute.
    #[must_use]
    pub fn get_object(&self, attribute: &str) -> Option<ObjectView<'a>> {
        self.get(attribute)
            .and_then(AttributeValue::as_object)
            .and_then(|id| self.snapshot.view(id))
    }

    /// Returns the containing object.
    #[must_use]
    pub fn container(&self) -> Option<ObjectView<'a>> {
        self.object.container.and_then(|id| self.snapshot.view(id))
    }

    /// Returns the nearest ancestor of the given type.
    #[must_use]
    pub fn ancestor(&self, object_type: ObjectType) -> Option<ObjectView<'a>> {
        let mut current = self.container();
        while let Some(view) = current {
            if view.object_type() == object_type {
                return Some(view);
            }
            current = view.container();
        }
        None
    }

    /// Returns the qualified name, outermost container first.
    #[must_use]
    pub fn reference(&self) -> ObjectReference {
        let mut parts = vec![self.object.name.clone()];
        let mut current = self.container();
        while let Some(view) = current {
            parts.push(view.object.name.clone());
            current = view.container();
        }
        parts.reverse();
        ObjectReference { parts }
    }

    /// Returns the qualified name without catalog segments.
    ///
    /// Snapshots of the same schema taken from differently named databases
    /// agree on this name, so it is what objects are matched on when two
    /// snapshots are compared. A catalog's own relative name is empty.
    #[must_use]
    pub fn relative_reference(&self) -> ObjectReference {
        let mut parts = Vec::new();
        let mut current = Some(*self);
        while let Some(view) = current {
            if view.object_type() != ObjectType::Catalog {
                parts.push(view.object.name.clone());
            }
            current = view.container();
        }
        parts.reverse();
        ObjectReference { parts }
    }

    /// Identity string used in error reports, e.g. `Sequence APP.SEQ_ID`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}", self.object.object_type, self.reference())
    }
}
