//! Database snapshots.
//!
//! A [`DatabaseSnapshot`] exclusively owns every [`DatabaseObject`] captured
//! in one pass. Snapshots are assembled with a [`SnapshotBuilder`] and are
//! immutable once built. Snapshots loaded from JSON keep their stored ids
//! and are validated against the same invariants as built ones.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidemarkError};
use crate::structure::{
    AttributeValue, DatabaseObject, ObjectReference, ObjectType, ObjectView, SnapshotId,
};

/// Identity of the database a snapshot was captured from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Dialect short name (e.g. `postgresql`).
    pub short_name: String,
    /// Connection URL.
    pub url: String,
    /// Product name reported by the database.
    pub product_name: String,
    /// Product version reported by the database.
    pub product_version: String,
    /// The connecting user.
    pub user: String,
}

impl DatabaseInfo {
    /// Creates database info with the given dialect short name and URL.
    #[must_use]
    pub fn new(short_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the product name and version.
    #[must_use]
    pub fn product(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.product_name = name.into();
        self.product_version = version.into();
        self
    }

    /// Sets the connecting user.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }
}

/// Which object types a snapshot pass was asked to capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotControl {
    types_to_include: BTreeSet<ObjectType>,
}

impl SnapshotControl {
    /// Creates a control including exactly the given types.
    #[must_use]
    pub fn new(types: impl IntoIterator<Item = ObjectType>) -> Self {
        Self {
            types_to_include: types.into_iter().collect(),
        }
    }

    /// Creates a control including every object type.
    #[must_use]
    pub fn all() -> Self {
        Self::new(ObjectType::ALL)
    }

    /// Returns true if the type was requested.
    #[must_use]
    pub fn includes(&self, object_type: ObjectType) -> bool {
        self.types_to_include.contains(&object_type)
    }

    /// Returns the included types sorted by type name.
    #[must_use]
    pub fn types_to_include(&self) -> Vec<ObjectType> {
        let mut types: Vec<ObjectType> = self.types_to_include.iter().copied().collect();
        types.sort_by_key(|t| t.name());
        types
    }
}

impl Default for SnapshotControl {
    fn default() -> Self {
        Self::all()
    }
}

/// On-disk shape of a snapshot, validated on the way in.
#[derive(Deserialize)]
struct SnapshotDocument {
    database: DatabaseInfo,
    control: SnapshotControl,
    objects: Vec<DatabaseObject>,
}

impl TryFrom<SnapshotDocument> for DatabaseSnapshot {
    type Error = TidemarkError;

    fn try_from(doc: SnapshotDocument) -> Result<Self> {
        Self::from_parts(doc.database, doc.control, doc.objects)
    }
}

/// An immutable, point-in-time graph of database structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SnapshotDocument")]
pub struct DatabaseSnapshot {
    database: DatabaseInfo,
    control: SnapshotControl,
    objects: Vec<DatabaseObject>,
    #[serde(skip)]
    index: HashMap<SnapshotId, usize>,
}

impl DatabaseSnapshot {
    fn from_parts(
        database: DatabaseInfo,
        control: SnapshotControl,
        objects: Vec<DatabaseObject>,
    ) -> Result<Self> {
        let mut index = HashMap::with_capacity(objects.len());
        for (position, object) in objects.iter().enumerate() {
            if index.insert(object.id, position).is_some() {
                return Err(TidemarkError::InvalidSnapshot(format!(
                    "duplicate snapshot id {}",
                    object.id
                )));
            }
        }
        let snapshot = Self {
            database,
            control,
            objects,
            index,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Checks every graph invariant.
    fn validate(&self) -> Result<()> {
        for object in &self.objects {
            if !self.control.includes(object.object_type) {
                return Err(TidemarkError::InvalidSnapshot(format!(
                    "{} '{}' is not an included type",
                    object.object_type, object.name
                )));
            }

            if let Some(container_id) = object.container {
                let container = self.get(container_id).ok_or_else(|| {
                    TidemarkError::InvalidSnapshot(format!(
                        "container {container_id} of '{}' does not exist",
                        object.name
                    ))
                })?;
                check_container(object.object_type, &object.name, container.object_type)?;
            }

            for (attribute, value) in &object.attributes {
                if !object.object_type.has_attribute(attribute) {
                    return Err(undeclared(object.object_type, attribute));
                }
                let mut dangling = None;
                value.for_each_reference(&mut |id| {
                    if dangling.is_none() && !self.index.contains_key(&id) {
                        dangling = Some(id);
                    }
                });
                if let Some(id) = dangling {
                    return Err(TidemarkError::InvalidSnapshot(format!(
                        "attribute '{attribute}' of '{}' references missing object {id}",
                        object.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns the database identity.
    #[must_use]
    pub fn database(&self) -> &DatabaseInfo {
        &self.database
    }

    /// Returns the snapshot control.
    #[must_use]
    pub fn control(&self) -> &SnapshotControl {
        &self.control
    }

    /// Returns an object by id.
    #[must_use]
    pub fn get(&self, id: SnapshotId) -> Option<&DatabaseObject> {
        self.index.get(&id).map(|&position| &self.objects[position])
    }

    /// Returns a view of an object by id.
    #[must_use]
    pub fn view(&self, id: SnapshotId) -> Option<ObjectView<'_>> {
        self.get(id).map(|object| ObjectView::new(self, object))
    }

    /// Iterates over all objects in capture order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectView<'_>> {
        self.objects.iter().map(move |o| ObjectView::new(self, o))
    }

    /// Returns the objects of one type in capture order.
    #[must_use]
    pub fn of_type(&self, object_type: ObjectType) -> Vec<ObjectView<'_>> {
        self.objects()
            .filter(|view| view.object_type() == object_type)
            .collect()
    }

    /// Finds the object whose qualified name ends with `reference`.
    ///
    /// A partial reference such as `USER.ID` matches `APP.USER.ID`. When it
    /// matches more than one object the lookup fails rather than guess.
    pub fn find(
        &self,
        object_type: ObjectType,
        reference: &ObjectReference,
    ) -> Result<Option<ObjectView<'_>>> {
        let mut matches = self.find_all(object_type, reference);
        if matches.len() > 1 {
            return Err(TidemarkError::AmbiguousReference {
                object_type,
                reference: reference.to_string(),
                matches: matches.len(),
            });
        }
        Ok(matches.pop())
    }

    /// Returns every object whose qualified name ends with `reference`, in
    /// capture order.
    #[must_use]
    pub fn find_all(&self, object_type: ObjectType, reference: &ObjectReference) -> Vec<ObjectView<'_>> {
        if reference.is_empty() {
            return Vec::new();
        }
        self.objects()
            .filter(|view| view.object_type() == object_type)
            .filter(|view| view.reference().as_list().ends_with(reference.as_list()))
            .collect()
    }

    /// Number of objects in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the snapshot holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Parses and validates a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Writes the snapshot to a file as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn undeclared(object_type: ObjectType, attribute: &str) -> TidemarkError {
    TidemarkError::InvalidSnapshot(format!(
        "attribute '{attribute}' is not declared for {object_type}"
    ))
}

fn check_container(object_type: ObjectType, name: &str, container_type: ObjectType) -> Result<()> {
    if object_type.container_types().contains(&container_type) {
        Ok(())
    } else {
        Err(TidemarkError::InvalidSnapshot(format!(
            "{object_type} '{name}' cannot be contained by a {container_type}"
        )))
    }
}

/// Assembles a snapshot during a capture pass.
///
/// Ids are handed out in creation order and containers must exist before
/// the objects they contain, so the container relation cannot cycle.
#[derive(Debug)]
pub struct SnapshotBuilder {
    database: DatabaseInfo,
    control: SnapshotControl,
    objects: Vec<DatabaseObject>,
    positions: HashMap<SnapshotId, usize>,
    next_id: u64,
}

impl SnapshotBuilder {
    /// Starts a new capture pass.
    #[must_use]
    pub fn new(database: DatabaseInfo, control: SnapshotControl) -> Self {
        Self {
            database,
            control,
            objects: Vec::new(),
            positions: HashMap::new(),
            next_id: 1,
        }
    }

    /// Adds an object and returns its new identity.
    pub fn add(
        &mut self,
        object_type: ObjectType,
        name: impl Into<String>,
        container: Option<SnapshotId>,
    ) -> Result<SnapshotId> {
        let name = name.into();
        if !self.control.includes(object_type) {
            return Err(TidemarkError::InvalidSnapshot(format!(
                "{object_type} '{name}' is not an included type"
            )));
        }
        if let Some(container_id) = container {
            let container_type = self
                .object(container_id)
                .map(|o| o.object_type)
                .ok_or_else(|| {
                    TidemarkError::InvalidSnapshot(format!(
                        "container {container_id} of '{name}' does not exist"
                    ))
                })?;
            check_container(object_type, &name, container_type)?;
        }

        let id = SnapshotId::new(self.next_id);
        self.next_id += 1;
        self.positions.insert(id, self.objects.len());
        self.objects.push(DatabaseObject {
            id,
            object_type,
            name,
            container,
            attributes: Default::default(),
        });
        Ok(id)
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(
        &mut self,
        id: SnapshotId,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<()> {
        let value = value.into();
        self.check_references(&value)?;
        let object = self.object_mut(id, attribute)?;
        object.attributes.insert(attribute.to_string(), value);
        Ok(())
    }

    /// Appends a value to a collection attribute, creating it if absent.
    pub fn push(
        &mut self,
        id: SnapshotId,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<()> {
        let value = value.into();
        self.check_references(&value)?;
        let object = self.object_mut(id, attribute)?;
        let slot = object
            .attributes
            .entry(attribute.to_string())
            .or_insert_with(|| AttributeValue::Collection(Vec::new()));
        match slot {
            AttributeValue::Collection(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(TidemarkError::InvalidSnapshot(format!(
                "attribute '{attribute}' already holds a scalar"
            ))),
        }
    }

    /// Finishes the capture pass.
    pub fn build(self) -> Result<DatabaseSnapshot> {
        DatabaseSnapshot::from_parts(self.database, self.control, self.objects)
    }

    fn object(&self, id: SnapshotId) -> Option<&DatabaseObject> {
        self.positions.get(&id).map(|&position| &self.objects[position])
    }

    fn object_mut(&mut self, id: SnapshotId, attribute: &str) -> Result<&mut DatabaseObject> {
        let object = self
            .positions
            .get(&id)
            .and_then(|&position| self.objects.get_mut(position))
            .ok_or_else(|| TidemarkError::InvalidSnapshot(format!("object {id} does not exist")))?;
        if !object.object_type.has_attribute(attribute) {
            return Err(undeclared(object.object_type, attribute));
        }
        Ok(object)
    }

    fn check_references(&self, value: &AttributeValue) -> Result<()> {
        let mut dangling = None;
        value.for_each_reference(&mut |id| {
            if dangling.is_none() && !self.positions.contains_key(&id) {
                dangling = Some(id);
            }
        });
        match dangling {
            Some(id) => Err(TidemarkError::InvalidSnapshot(format!(
                "reference to missing object {id}"
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new(DatabaseInfo::new("generic", "jdbc:test"), SnapshotControl::all())
    }

    #[test]
    fn test_build_and_find() {
        let mut b = builder();
        let schema = b.add(ObjectType::Schema, "APP", None).unwrap();
        let table = b.add(ObjectType::Table, "USER", Some(schema)).unwrap();
        let column = b.add(ObjectType::Column, "ID", Some(table)).unwrap();
        b.set(column, "relation", table).unwrap();
        b.push(table, "columns", column).unwrap();
        let snapshot = b.build().unwrap();

        let found = snapshot
            .find(ObjectType::Column, &"USER.ID".parse().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), column);
        assert_eq!(found.reference().to_string(), "APP.USER.ID");
        assert_eq!(found.ancestor(ObjectType::Schema).unwrap().name(), "APP");
        assert!(snapshot
            .find(ObjectType::Column, &"OTHER.ID".parse().unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_find_rejects_ambiguous_reference() {
        let mut b = builder();
        for schema_name in ["OTHER", "APP"] {
            let schema = b.add(ObjectType::Schema, schema_name, None).unwrap();
            let table = b.add(ObjectType::Table, "USER", Some(schema)).unwrap();
            b.add(ObjectType::Column, "ID", Some(table)).unwrap();
        }
        let snapshot = b.build().unwrap();

        let partial = "USER.ID".parse().unwrap();
        assert_eq!(snapshot.find_all(ObjectType::Column, &partial).len(), 2);
        let err = snapshot.find(ObjectType::Column, &partial).unwrap_err();
        assert!(matches!(
            err,
            TidemarkError::AmbiguousReference { matches: 2, .. }
        ));

        let qualified = snapshot
            .find(ObjectType::Column, &"APP.USER.ID".parse().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(qualified.ancestor(ObjectType::Schema).unwrap().name(), "APP");
    }

    #[test]
    fn test_builder_resolves_objects_by_id() {
        let mut b = builder();
        let schema = b.add(ObjectType::Schema, "APP", None).unwrap();
        let table = b.add(ObjectType::Table, "WIDE", Some(schema)).unwrap();
        let mut columns = Vec::new();
        for i in 0..2000 {
            let column = b.add(ObjectType::Column, format!("C{i}"), Some(table)).unwrap();
            b.set(column, "relation", table).unwrap();
            b.push(table, "columns", column).unwrap();
            columns.push(column);
        }
        assert!(b.set(SnapshotId::new(9999), "nullable", true).is_err());
        let snapshot = b.build().unwrap();

        assert_eq!(snapshot.len(), 2002);
        let last = snapshot.view(columns[1999]).unwrap();
        assert_eq!(last.reference().to_string(), "APP.WIDE.C1999");
        assert_eq!(last.get_object("relation").unwrap().id(), table);
    }

    #[test]
    fn test_rejects_illegal_container() {
        let mut b = builder();
        let schema = b.add(ObjectType::Schema, "APP", None).unwrap();
        let result = b.add(ObjectType::Column, "ID", Some(schema));
        assert!(matches!(result, Err(TidemarkError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_rejects_undeclared_attribute() {
        let mut b = builder();
        let schema = b.add(ObjectType::Schema, "APP", None).unwrap();
        let seq = b.add(ObjectType::Sequence, "SEQ", Some(schema)).unwrap();
        assert!(b.set(seq, "nullable", true).is_err());
        assert!(b.set(seq, "incrementBy", 1).is_ok());
    }

    #[test]
    fn test_rejects_excluded_type() {
        let mut b = SnapshotBuilder::new(
            DatabaseInfo::default(),
            SnapshotControl::new([ObjectType::Schema, ObjectType::Table]),
        );
        let schema = b.add(ObjectType::Schema, "APP", None).unwrap();
        assert!(b.add(ObjectType::Sequence, "SEQ", Some(schema)).is_err());
    }

    #[test]
    fn test_json_rejects_dangling_reference() {
        let json = r#"{
            "database": {"short_name": "generic", "url": "", "product_name": "",
                         "product_version": "", "user": ""},
            "control": {"types_to_include": ["Schema", "Table", "Column"]},
            "objects": [
                {"id": 1, "object_type": "Schema", "name": "APP", "container": null},
                {"id": 2, "object_type": "Table", "name": "T", "container": 1,
                 "attributes": {"columns": {"collection": [{"object": 9}]}}}
            ]
        }"#;
        let err = DatabaseSnapshot::from_json(json).unwrap_err();
        assert!(err.to_string().contains("missing object #9"), "{err}");
    }

    #[test]
    fn test_json_keeps_stored_ids() {
        let mut b = builder();
        let schema = b.add(ObjectType::Schema, "APP", None).unwrap();
        b.add(ObjectType::Sequence, "SEQ", Some(schema)).unwrap();
        let snapshot = b.build().unwrap();

        let reloaded = DatabaseSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        let seq = reloaded
            .find(ObjectType::Sequence, &"APP.SEQ".parse().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(seq.id().get(), 2);
        assert_eq!(seq.container().unwrap().id(), schema);
    }

    #[test]
    fn test_included_types_sorted_by_name() {
        let control = SnapshotControl::new([ObjectType::Table, ObjectType::Column, ObjectType::Sequence]);
        assert_eq!(
            control.types_to_include(),
            vec![ObjectType::Column, ObjectType::Sequence, ObjectType::Table]
        );
    }
}
