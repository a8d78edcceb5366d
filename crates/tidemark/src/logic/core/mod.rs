//! The core logic catalog.
//!
//! Higher-level actions delegate to [`AlterColumnLogic`] and
//! [`SelectDataLogic`], which are the primitive SQL-emitting logics most
//! chains bottom out at.

mod auto_increment;
mod column;
mod select;
mod sequence;
mod sql;
mod table;

pub use auto_increment::{AddAutoIncrementLogic, AddAutoIncrementPostgresLogic};
pub use column::{
    AddColumnLogic, AlterColumnLogic, DropColumnLogic, ModifyDataTypeLogic, SetDefaultValueLogic,
    SetNullableLogic,
};
pub use select::{
    GetNextChangeSetSequenceValueLogic, SelectDataLogic, SelectFromDatabaseChangeLogLockLogic,
    SelectFromDatabaseChangeLogLogic,
};
pub use sequence::{AlterSequenceLogic, CreateSequenceLogic, DropSequenceLogic};
pub use sql::ExecuteSqlLogic;
pub use table::{CreateTableLogic, DropTableLogic};

use crate::action::{ColumnDefinition, ValidationErrors};
use crate::error::Result;
use crate::scope::Scope;
use crate::structure::{DatabaseObject, ObjectReference, ObjectType};

use super::LogicRegistry;

/// Registers every core logic.
pub fn register_all(registry: &mut LogicRegistry) {
    registry
        .register(AddAutoIncrementLogic)
        .register(AddAutoIncrementPostgresLogic)
        .register(AlterColumnLogic)
        .register(AddColumnLogic)
        .register(DropColumnLogic)
        .register(ModifyDataTypeLogic)
        .register(SetNullableLogic)
        .register(SetDefaultValueLogic)
        .register(CreateTableLogic)
        .register(DropTableLogic)
        .register(CreateSequenceLogic)
        .register(AlterSequenceLogic)
        .register(DropSequenceLogic)
        .register(SelectDataLogic)
        .register(SelectFromDatabaseChangeLogLogic)
        .register(SelectFromDatabaseChangeLogLockLogic)
        .register(GetNextChangeSetSequenceValueLogic)
        .register(ExecuteSqlLogic);
}

/// Requires a column reference that names its table.
fn check_column_name(errors: &mut ValidationErrors, field: &str, column: Option<&ObjectReference>) {
    errors.check_required_field(field, &column.cloned());
    if let Some(column) = column {
        if !column.is_empty() && column.container().is_none() {
            errors.add("Table name is required");
        }
    }
}

/// Splits `APP.USER.ID` into the qualified table and the column name.
fn split_column<'r>(scope: &Scope, column: &'r ObjectReference) -> (String, &'r str) {
    let table = column
        .container()
        .map(|table| scope.database().qualify(&table))
        .unwrap_or_default();
    (table, column.name().unwrap_or_default())
}

/// Looks up an object through the scope's connection.
fn lookup(
    scope: &Scope,
    object_type: ObjectType,
    reference: &ObjectReference,
) -> Result<Option<DatabaseObject>> {
    scope.connection()?.lookup(object_type, reference)
}

/// Renders a column definition as used in CREATE TABLE and ADD COLUMN.
fn column_definition(scope: &Scope, column: &ColumnDefinition) -> String {
    let db = scope.database();
    let mut parts = vec![db.quote_identifier(&column.name), scope.type_sql(&column.data_type)];
    if column.auto_increment && db.supports_auto_increment() {
        parts.push(db.auto_increment_clause().to_string());
    }
    if !column.nullable {
        parts.push("NOT NULL".to_string());
    }
    if let Some(default) = &column.default_value {
        parts.push(format!("DEFAULT {default}"));
    }
    parts.join(" ")
}
