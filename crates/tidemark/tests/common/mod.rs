#![allow(dead_code)]

use std::sync::Arc;

use tidemark::action::{Action, ActionResult, ActionStatus};
use tidemark::dialect::{GenericDatabase, PostgresDatabase, SqliteDatabase};
use tidemark::error::{Result, TidemarkError};
use tidemark::logic::{ActionLogic, ActionMatch};
use tidemark::scope::Scope;
use tidemark::snapshot::{DatabaseInfo, DatabaseSnapshot, SnapshotBuilder, SnapshotControl};
use tidemark::structure::{ObjectType, SnapshotId};

pub fn generic_scope() -> Scope {
    Scope::new(Arc::new(GenericDatabase::new()))
}

pub fn postgres_scope() -> Scope {
    Scope::new(Arc::new(PostgresDatabase::new()))
}

pub fn sqlite_scope() -> Scope {
    Scope::new(Arc::new(SqliteDatabase::new()))
}

/// Ids of the objects added by [`Fixture::user_table`].
pub struct UserTable {
    pub table: SnapshotId,
    pub id: SnapshotId,
    pub name: SnapshotId,
    pub primary_key: SnapshotId,
}

/// A snapshot builder already holding catalog `DB` and schema `APP`.
pub struct Fixture {
    pub builder: SnapshotBuilder,
    pub catalog: SnapshotId,
    pub schema: SnapshotId,
}

impl Fixture {
    pub fn new() -> Self {
        Self::in_catalog("DB")
    }

    /// Same as [`Fixture::new`] but under the given catalog name.
    pub fn in_catalog(catalog: &str) -> Self {
        Self::build_with(
            DatabaseInfo::new("postgresql", "jdbc:postgresql://localhost/app"),
            catalog,
        )
    }

    pub fn with_info(info: DatabaseInfo) -> Self {
        Self::build_with(info, "DB")
    }

    fn build_with(info: DatabaseInfo, catalog_name: &str) -> Self {
        let mut builder = SnapshotBuilder::new(info, SnapshotControl::all());
        let catalog = builder
            .add(ObjectType::Catalog, catalog_name, None)
            .expect("catalog");
        let schema = builder
            .add(ObjectType::Schema, "APP", Some(catalog))
            .expect("schema");
        Self {
            builder,
            catalog,
            schema,
        }
    }

    /// Adds another schema to the catalog.
    pub fn add_schema(&mut self, name: &str) -> SnapshotId {
        self.builder
            .add(ObjectType::Schema, name, Some(self.catalog))
            .expect("schema")
    }

    /// Adds `APP.USER` with a non-null `ID BIGINT` primary key and a
    /// `NAME VARCHAR(100)` column.
    pub fn user_table(&mut self) -> UserTable {
        self.user_table_in(self.schema)
    }

    /// Adds the `USER` table of [`Fixture::user_table`] to any schema.
    pub fn user_table_in(&mut self, schema: SnapshotId) -> UserTable {
        let b = &mut self.builder;
        let table = b.add(ObjectType::Table, "USER", Some(schema)).unwrap();
        let id = b.add(ObjectType::Column, "ID", Some(table)).unwrap();
        b.set(id, "type", "BIGINT").unwrap();
        b.set(id, "nullable", false).unwrap();
        b.set(id, "relation", table).unwrap();
        let name = b.add(ObjectType::Column, "NAME", Some(table)).unwrap();
        b.set(name, "type", "VARCHAR(100)").unwrap();
        b.set(name, "relation", table).unwrap();
        b.push(table, "columns", id).unwrap();
        b.push(table, "columns", name).unwrap();
        let pk = b.add(ObjectType::PrimaryKey, "PK_USER", Some(table)).unwrap();
        b.push(pk, "columns", id).unwrap();
        b.set(table, "primaryKey", pk).unwrap();
        UserTable {
            table,
            id,
            name,
            primary_key: pk,
        }
    }

    /// Adds sequence `APP.SEQ_ID` with the given increment.
    pub fn sequence(&mut self, increment_by: i64) -> SnapshotId {
        self.sequence_in(self.schema, "SEQ_ID", increment_by)
    }

    /// Adds a sequence to any schema.
    pub fn sequence_in(&mut self, schema: SnapshotId, name: &str, increment_by: i64) -> SnapshotId {
        let b = &mut self.builder;
        let seq = b.add(ObjectType::Sequence, name, Some(schema)).unwrap();
        b.set(seq, "startValue", 1_i64).unwrap();
        b.set(seq, "incrementBy", increment_by).unwrap();
        b.set(seq, "cacheSize", 20_i64).unwrap();
        seq
    }

    pub fn build(self) -> DatabaseSnapshot {
        self.builder.build().expect("valid snapshot")
    }
}

/// A logic answering with fixed behavior, for dispatch tests.
pub struct StubLogic {
    pub name: &'static str,
    pub matches: ActionMatch,
    pub priority: i32,
    pub delegate_to: Vec<Action>,
    pub fail_status: bool,
    pub only_on: Option<&'static str>,
}

impl StubLogic {
    pub fn new(name: &'static str, matches: ActionMatch, priority: i32) -> Self {
        Self {
            name,
            matches,
            priority,
            delegate_to: Vec::new(),
            fail_status: false,
            only_on: None,
        }
    }

    pub fn delegating(mut self, actions: Vec<Action>) -> Self {
        self.delegate_to = actions;
        self
    }

    pub fn failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    pub fn only_on(mut self, short_name: &'static str) -> Self {
        self.only_on = Some(short_name);
        self
    }
}

impl ActionLogic for StubLogic {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supported_action(&self) -> ActionMatch {
        self.matches
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn supports_scope(&self, scope: &Scope) -> bool {
        self.only_on
            .map_or(true, |name| scope.database().short_name() == name)
    }

    fn check_status(&self, _action: &Action, _scope: &Scope) -> Result<ActionStatus> {
        if self.fail_status {
            return Err(TidemarkError::Connection(
                "connection reset by peer".to_string(),
            ));
        }
        Ok(ActionStatus::applied())
    }

    fn execute(&self, _action: &Action, _scope: &Scope) -> Result<ActionResult> {
        if self.delegate_to.is_empty() {
            Ok(ActionResult::sql(format!("-- {}", self.name)))
        } else {
            Ok(ActionResult::delegate(self.delegate_to.clone()))
        }
    }
}
