//! Human-readable snapshot rendering.
//!
//! The output is meant for people and golden tests, not for parsing back.
//! It is deterministic: serializing the same snapshot twice yields the
//! same bytes.

use std::fmt::Write as _;
use std::io::Write;

use crate::error::Result;
use crate::snapshot::DatabaseSnapshot;
use crate::structure::{AttributeValue, ObjectType, ObjectView, SnapshotId};

const DIVIDER: &str = "-----------------------------------------------------------------";

/// Attributes that repeat what the grouping already shows.
const HIDDEN_ATTRIBUTES: [&str; 3] = ["name", "schema", "catalog"];

/// Renders a [`DatabaseSnapshot`] as indented text.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotSerializer {
    indent: usize,
}

impl Default for SnapshotSerializer {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

impl SnapshotSerializer {
    /// Creates a serializer indenting by four spaces.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation width.
    #[must_use]
    pub fn indent(mut self, width: usize) -> Self {
        self.indent = width;
        self
    }

    /// Renders the whole snapshot.
    #[must_use]
    pub fn serialize(&self, snapshot: &DatabaseSnapshot) -> String {
        let mut out = Output {
            text: String::new(),
            indent: self.indent,
        };
        let database = snapshot.database();
        out.line(0, &format!("Database snapshot for {}", database.url));
        out.line(0, DIVIDER);
        out.line(0, &format!("Database type: {}", database.product_name));
        out.line(0, &format!("Database version: {}", database.product_version));
        out.line(0, &format!("Database user: {}", database.user));

        let included = snapshot.control().types_to_include();
        out.line(0, "Included types:");
        for object_type in &included {
            out.line(1, object_type.name());
        }

        let mut schemas = snapshot.of_type(ObjectType::Schema);
        schemas.sort_by_key(|schema| schema.reference().to_string());
        for schema in schemas {
            out.line(0, &format!("Schema: {}", schema.reference()));
            for &object_type in &included {
                if matches!(
                    object_type,
                    ObjectType::Catalog | ObjectType::Schema | ObjectType::Column
                ) {
                    continue;
                }
                let mut objects: Vec<ObjectView<'_>> = snapshot
                    .of_type(object_type)
                    .into_iter()
                    .filter(|view| {
                        view.ancestor(ObjectType::Schema)
                            .is_some_and(|owner| owner.id() == schema.id())
                    })
                    .collect();
                if objects.is_empty() {
                    continue;
                }
                objects.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));

                out.line(1, &format!("{object_type}:"));
                for object in objects {
                    out.line(2, object.name());
                    render_object(&mut out, &object, 3, &mut Vec::new());
                }
            }
        }

        out.text.replace("\r\n", "\n").replace('\r', "\n")
    }

    /// Writes the rendering to `writer`.
    pub fn write(&self, snapshot: &DatabaseSnapshot, writer: &mut impl Write) -> Result<()> {
        writer.write_all(self.serialize(snapshot).as_bytes())?;
        Ok(())
    }
}

struct Output {
    text: String,
    indent: usize,
}

impl Output {
    /// Appends `text` at `depth`, indenting every line it spans.
    fn line(&mut self, depth: usize, text: &str) {
        let pad = depth * self.indent;
        let mut lines = text.lines().peekable();
        if lines.peek().is_none() {
            let _ = writeln!(self.text, "{:pad$}", "");
            return;
        }
        for line in lines {
            let _ = writeln!(self.text, "{:pad$}{line}", "");
        }
    }
}

/// Renders the attributes of `view`. `ancestors` holds the objects being
/// rendered above this one; references back to any of them are skipped.
fn render_object(
    out: &mut Output,
    view: &ObjectView<'_>,
    depth: usize,
    ancestors: &mut Vec<SnapshotId>,
) {
    ancestors.push(view.id());
    let expand = matches!(view.object_type(), ObjectType::Table | ObjectType::View);
    for (attribute, value) in &view.object().attributes {
        if HIDDEN_ATTRIBUTES.contains(&attribute.as_str()) {
            continue;
        }
        render_attribute(out, view, attribute, value, expand, depth, ancestors);
    }
    ancestors.pop();
}

fn render_attribute(
    out: &mut Output,
    owner: &ObjectView<'_>,
    attribute: &str,
    value: &AttributeValue,
    expand: bool,
    depth: usize,
    ancestors: &mut Vec<SnapshotId>,
) {
    match value {
        AttributeValue::Object(_) => {
            let Some(nested) = nested(owner, value, ancestors) else {
                return;
            };
            out.line(depth, &format!("{attribute}: {}", nested.name()));
            if expand {
                render_object(out, &nested, depth + 1, ancestors);
            }
        }
        AttributeValue::Collection(items) => {
            let items: Vec<&AttributeValue> = items
                .iter()
                .filter(|item| match item {
                    AttributeValue::Object(_) => nested(owner, item, ancestors).is_some(),
                    _ => true,
                })
                .collect();
            if items.is_empty() {
                return;
            }
            let has_objects = items
                .iter()
                .any(|item| matches!(item, AttributeValue::Object(_)));
            if expand && has_objects {
                out.line(depth, &format!("{attribute}:"));
                for item in items {
                    match nested(owner, item, ancestors) {
                        Some(element) => {
                            out.line(depth + 1, element.name());
                            render_object(out, &element, depth + 2, ancestors);
                        }
                        None => out.line(depth + 1, &inline(owner, item)),
                    }
                }
            } else {
                let joined: Vec<String> = items.iter().map(|item| inline(owner, item)).collect();
                out.line(depth, &format!("{attribute}: {}", joined.join(", ")));
            }
        }
        scalar => out.line(depth, &format!("{attribute}: {}", inline(owner, scalar))),
    }
}

/// Resolves an object reference worth rendering: not a schema and not an
/// object already being rendered.
fn nested<'a>(
    owner: &ObjectView<'a>,
    value: &AttributeValue,
    ancestors: &[SnapshotId],
) -> Option<ObjectView<'a>> {
    let id = value.as_object()?;
    if ancestors.contains(&id) {
        return None;
    }
    owner
        .snapshot()
        .view(id)
        .filter(|view| view.object_type() != ObjectType::Schema)
}

/// One-line form of a value; objects show their name only.
fn inline(owner: &ObjectView<'_>, value: &AttributeValue) -> String {
    match value {
        AttributeValue::Text(text) => text.clone(),
        AttributeValue::Integer(i) => i.to_string(),
        AttributeValue::Boolean(b) => b.to_string(),
        AttributeValue::Object(id) => owner
            .snapshot()
            .view(*id)
            .map_or_else(|| id.to_string(), |view| view.name().to_string()),
        AttributeValue::Collection(items) => {
            let parts: Vec<String> = items.iter().map(|item| inline(owner, item)).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{DatabaseInfo, SnapshotBuilder, SnapshotControl};

    fn snapshot_with_view() -> DatabaseSnapshot {
        let mut builder = SnapshotBuilder::new(
            DatabaseInfo::new("generic", "jdbc:test").product("Generic", "1.0"),
            SnapshotControl::new([
                ObjectType::Catalog,
                ObjectType::Schema,
                ObjectType::View,
                ObjectType::Column,
            ]),
        );
        let catalog = builder.add(ObjectType::Catalog, "DB", None).unwrap();
        let schema = builder.add(ObjectType::Schema, "APP", Some(catalog)).unwrap();
        let view = builder.add(ObjectType::View, "ACTIVE", Some(schema)).unwrap();
        builder
            .set(view, "definition", "SELECT *\r\nFROM USER")
            .unwrap();
        builder.set(view, "schema", schema).unwrap();
        let id = builder.add(ObjectType::Column, "ID", Some(view)).unwrap();
        builder.set(id, "relation", view).unwrap();
        builder.push(view, "columns", id).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_view_rendering() {
        let text = SnapshotSerializer::new().serialize(&snapshot_with_view());
        let expected = "\
Database snapshot for jdbc:test
-----------------------------------------------------------------
Database type: Generic
Database version: 1.0
Database user: 
Included types:
    Catalog
    Column
    Schema
    View
Schema: DB.APP
    View:
        ACTIVE
            columns:
                ID
            definition: SELECT *
            FROM USER
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_collection_is_absent() {
        let mut builder = SnapshotBuilder::new(
            DatabaseInfo::new("generic", "jdbc:test"),
            SnapshotControl::all(),
        );
        let catalog = builder.add(ObjectType::Catalog, "DB", None).unwrap();
        let schema = builder.add(ObjectType::Schema, "APP", Some(catalog)).unwrap();
        let table = builder.add(ObjectType::Table, "T", Some(schema)).unwrap();
        builder
            .set(table, "indexes", AttributeValue::Collection(Vec::new()))
            .unwrap();
        let text = SnapshotSerializer::new().serialize(&builder.build().unwrap());
        assert!(!text.contains("indexes"));
        assert!(text.ends_with("    Table:\n        T\n"));
    }

    #[test]
    fn test_write_matches_serialize() {
        let snapshot = snapshot_with_view();
        let serializer = SnapshotSerializer::new().indent(2);
        let mut buffer = Vec::new();
        serializer.write(&snapshot, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), serializer.serialize(&snapshot));
    }
}
