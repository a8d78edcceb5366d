//! Abstract, dialect-independent actions.
//!
//! An [`Action`] only describes a schema operation; it carries no
//! behavior. The [`ActionEngine`](crate::logic::ActionEngine) turns it into
//! SQL by resolving a logic implementation for the active dialect.

mod clauses;
mod result;
mod status;
mod validation;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use clauses::{Clause, Clauses};
pub use result::{ActionResult, DelegateResult, TerminalResult};
pub use status::{ActionStatus, Verdict};
pub use validation::{Required, ValidationErrors};

use crate::structure::ObjectReference;
use crate::types::DataType;

/// Polymorphic grouping of action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionFamily {
    /// Creates a database object.
    Create,
    /// Changes an existing database object.
    Alter,
    /// Removes a database object.
    Drop,
    /// Reads data.
    Query,
    /// Runs caller-supplied SQL.
    Sql,
}

/// Discriminator of [`Action`] variants, used as the dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    AddAutoIncrement,
    AlterColumn,
    AddColumn,
    DropColumn,
    ModifyDataType,
    SetNullable,
    SetDefaultValue,
    CreateTable,
    DropTable,
    CreateSequence,
    AlterSequence,
    DropSequence,
    SelectData,
    SelectFromDatabaseChangeLog,
    SelectFromDatabaseChangeLogLock,
    GetNextChangeSetSequenceValue,
    ExecuteSql,
}

impl ActionKind {
    /// Returns the action name as used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddAutoIncrement => "addAutoIncrement",
            Self::AlterColumn => "alterColumn",
            Self::AddColumn => "addColumn",
            Self::DropColumn => "dropColumn",
            Self::ModifyDataType => "modifyDataType",
            Self::SetNullable => "setNullable",
            Self::SetDefaultValue => "setDefaultValue",
            Self::CreateTable => "createTable",
            Self::DropTable => "dropTable",
            Self::CreateSequence => "createSequence",
            Self::AlterSequence => "alterSequence",
            Self::DropSequence => "dropSequence",
            Self::SelectData => "selectData",
            Self::SelectFromDatabaseChangeLog => "selectFromDatabaseChangeLog",
            Self::SelectFromDatabaseChangeLogLock => "selectFromDatabaseChangeLogLock",
            Self::GetNextChangeSetSequenceValue => "getNextChangeSetSequenceValue",
            Self::ExecuteSql => "executeSql",
        }
    }

    /// Returns the family this kind belongs to.
    #[must_use]
    pub const fn family(self) -> ActionFamily {
        match self {
            Self::AddColumn | Self::CreateTable | Self::CreateSequence => ActionFamily::Create,
            Self::AddAutoIncrement
            | Self::AlterColumn
            | Self::ModifyDataType
            | Self::SetNullable
            | Self::SetDefaultValue
            | Self::AlterSequence => ActionFamily::Alter,
            Self::DropColumn | Self::DropTable | Self::DropSequence => ActionFamily::Drop,
            Self::SelectData
            | Self::SelectFromDatabaseChangeLog
            | Self::SelectFromDatabaseChangeLogLock
            | Self::GetNextChangeSetSequenceValue => ActionFamily::Query,
            Self::ExecuteSql => ActionFamily::Sql,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A column as declared in CREATE TABLE or ADD COLUMN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Column type.
    pub data_type: DataType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Default value expression.
    pub default_value: Option<String>,
    /// Whether the column is an identity column.
    pub auto_increment: bool,
}

impl ColumnDefinition {
    /// Creates a nullable column without default.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default_value: None,
            auto_increment: false,
        }
    }

    /// Sets nullability.
    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the default value expression.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Marks the column as an identity column.
    #[must_use]
    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }
}

/// Turns an existing column into an identity column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAutoIncrementAction {
    /// Qualified column name; must include the table.
    pub column_name: Option<ObjectReference>,
    /// Column type to declare.
    pub column_data_type: Option<DataType>,
    /// First generated value.
    pub start_with: Option<i64>,
    /// Step between generated values.
    pub increment_by: Option<i64>,
}

/// Alters a column with pre-rendered clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterColumnAction {
    /// Qualified column name; must include the table.
    pub column_name: Option<ObjectReference>,
    /// Clauses appended after `ALTER COLUMN <name>`.
    pub clauses: Clauses,
}

/// Adds a column to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddColumnAction {
    /// Qualified table name.
    pub table_name: Option<ObjectReference>,
    /// The new column.
    pub column: ColumnDefinition,
}

/// Removes a column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnAction {
    /// Qualified column name; must include the table.
    pub column_name: Option<ObjectReference>,
}

/// Changes a column's type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyDataTypeAction {
    /// Qualified column name; must include the table.
    pub column_name: Option<ObjectReference>,
    /// The new type.
    pub new_data_type: Option<DataType>,
}

/// Adds or drops a NOT NULL constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetNullableAction {
    /// Qualified column name; must include the table.
    pub column_name: Option<ObjectReference>,
    /// Whether NULL becomes allowed.
    pub nullable: bool,
}

/// Sets or drops a column default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDefaultValueAction {
    /// Qualified column name; must include the table.
    pub column_name: Option<ObjectReference>,
    /// The new default expression. `None` drops the default.
    pub default_value: Option<String>,
}

/// Creates a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableAction {
    /// Qualified table name.
    pub table_name: Option<ObjectReference>,
    /// Column definitions.
    pub columns: Vec<ColumnDefinition>,
    /// Primary key column names.
    pub primary_key: Vec<String>,
}

/// Drops a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableAction {
    /// Qualified table name.
    pub table_name: Option<ObjectReference>,
    /// Whether dependent objects are dropped too.
    pub cascade: bool,
}

/// Sequence settings shared by create and alter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSettings {
    /// Step between values.
    pub increment_by: Option<i64>,
    /// Lowest value.
    pub min_value: Option<i64>,
    /// Highest value.
    pub max_value: Option<i64>,
    /// Whether values are generated in request order.
    pub ordered: Option<bool>,
    /// Number of values cached.
    pub cache_size: Option<i64>,
    /// Whether the sequence wraps around.
    pub will_cycle: Option<bool>,
}

impl SequenceSettings {
    /// Returns true if no setting is given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Creates a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSequenceAction {
    /// Qualified sequence name.
    pub sequence_name: Option<ObjectReference>,
    /// First value.
    pub start_value: Option<i64>,
    /// Remaining settings.
    pub settings: SequenceSettings,
}

/// Alters a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterSequenceAction {
    /// Qualified sequence name.
    pub sequence_name: Option<ObjectReference>,
    /// Settings to change; absent settings are left alone.
    pub settings: SequenceSettings,
}

/// Drops a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSequenceAction {
    /// Qualified sequence name.
    pub sequence_name: Option<ObjectReference>,
}

/// Selects columns from a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectDataAction {
    /// Qualified table name.
    pub table_name: Option<ObjectReference>,
    /// Column expressions; empty selects everything.
    pub columns: Vec<String>,
}

/// Selects from the change-tracking table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectFromDatabaseChangeLogAction {
    /// Column expressions; empty selects everything.
    pub select_columns: Vec<String>,
}

/// Selects from the change-tracking lock table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectFromDatabaseChangeLogLockAction {
    /// Column expressions; at least one is required.
    pub select_columns: Vec<String>,
}

/// Runs raw SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSqlAction {
    /// The statement.
    pub sql: Option<String>,
}

/// An abstract schema or data operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    AddAutoIncrement(AddAutoIncrementAction),
    AlterColumn(AlterColumnAction),
    AddColumn(AddColumnAction),
    DropColumn(DropColumnAction),
    ModifyDataType(ModifyDataTypeAction),
    SetNullable(SetNullableAction),
    SetDefaultValue(SetDefaultValueAction),
    CreateTable(CreateTableAction),
    DropTable(DropTableAction),
    CreateSequence(CreateSequenceAction),
    AlterSequence(AlterSequenceAction),
    DropSequence(DropSequenceAction),
    SelectData(SelectDataAction),
    SelectFromDatabaseChangeLog(SelectFromDatabaseChangeLogAction),
    SelectFromDatabaseChangeLogLock(SelectFromDatabaseChangeLogLockAction),
    GetNextChangeSetSequenceValue,
    ExecuteSql(ExecuteSqlAction),
}

impl Action {
    /// Convenience constructor for adding auto-increment to a column.
    #[must_use]
    pub fn add_auto_increment(column: &str, data_type: DataType) -> Self {
        Self::AddAutoIncrement(AddAutoIncrementAction {
            column_name: Some(parse_reference(column)),
            column_data_type: Some(data_type),
            ..Default::default()
        })
    }

    /// Convenience constructor for altering a column.
    #[must_use]
    pub fn alter_column(column: ObjectReference, clauses: Clauses) -> Self {
        Self::AlterColumn(AlterColumnAction {
            column_name: Some(column),
            clauses,
        })
    }

    /// Convenience constructor for selecting data.
    #[must_use]
    pub fn select_data(table: ObjectReference, columns: Vec<String>) -> Self {
        Self::SelectData(SelectDataAction {
            table_name: Some(table),
            columns,
        })
    }

    /// Convenience constructor for raw SQL.
    #[must_use]
    pub fn execute_sql(sql: impl Into<String>) -> Self {
        Self::ExecuteSql(ExecuteSqlAction {
            sql: Some(sql.into()),
        })
    }

    /// Returns the dispatch key of this action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::AddAutoIncrement(_) => ActionKind::AddAutoIncrement,
            Self::AlterColumn(_) => ActionKind::AlterColumn,
            Self::AddColumn(_) => ActionKind::AddColumn,
            Self::DropColumn(_) => ActionKind::DropColumn,
            Self::ModifyDataType(_) => ActionKind::ModifyDataType,
            Self::SetNullable(_) => ActionKind::SetNullable,
            Self::SetDefaultValue(_) => ActionKind::SetDefaultValue,
            Self::CreateTable(_) => ActionKind::CreateTable,
            Self::DropTable(_) => ActionKind::DropTable,
            Self::CreateSequence(_) => ActionKind::CreateSequence,
            Self::AlterSequence(_) => ActionKind::AlterSequence,
            Self::DropSequence(_) => ActionKind::DropSequence,
            Self::SelectData(_) => ActionKind::SelectData,
            Self::SelectFromDatabaseChangeLog(_) => ActionKind::SelectFromDatabaseChangeLog,
            Self::SelectFromDatabaseChangeLogLock(_) => ActionKind::SelectFromDatabaseChangeLogLock,
            Self::GetNextChangeSetSequenceValue => ActionKind::GetNextChangeSetSequenceValue,
            Self::ExecuteSql(_) => ActionKind::ExecuteSql,
        }
    }

    /// Returns the family of this action.
    #[must_use]
    pub const fn family(&self) -> ActionFamily {
        self.kind().family()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match self {
            Self::AddAutoIncrement(a) => a.column_name.as_ref(),
            Self::AlterColumn(a) => a.column_name.as_ref(),
            Self::AddColumn(a) => a.table_name.as_ref(),
            Self::DropColumn(a) => a.column_name.as_ref(),
            Self::ModifyDataType(a) => a.column_name.as_ref(),
            Self::SetNullable(a) => a.column_name.as_ref(),
            Self::SetDefaultValue(a) => a.column_name.as_ref(),
            Self::CreateTable(a) => a.table_name.as_ref(),
            Self::DropTable(a) => a.table_name.as_ref(),
            Self::CreateSequence(a) => a.sequence_name.as_ref(),
            Self::AlterSequence(a) => a.sequence_name.as_ref(),
            Self::DropSequence(a) => a.sequence_name.as_ref(),
            Self::SelectData(a) => a.table_name.as_ref(),
            Self::SelectFromDatabaseChangeLog(_)
            | Self::SelectFromDatabaseChangeLogLock(_)
            | Self::GetNextChangeSetSequenceValue
            | Self::ExecuteSql(_) => None,
        };
        match target {
            Some(target) => write!(f, "{} {}", self.kind(), target),
            None => write!(f, "{}", self.kind()),
        }
    }
}

fn parse_reference(s: &str) -> ObjectReference {
    match s.parse() {
        Ok(reference) => reference,
        Err(never) => match never {},
    }
}
