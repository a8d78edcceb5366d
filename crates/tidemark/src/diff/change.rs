//! Changes produced by diffing.
//!
//! A [`Change`] is a serializable, concrete schema edit. It knows its own
//! undo when it carries enough of the original state, and lowers to the
//! [`Action`]s the dispatch engine turns into SQL.

use serde::{Deserialize, Serialize};

use crate::action::{
    Action, AddAutoIncrementAction, AddColumnAction, AlterSequenceAction, ColumnDefinition,
    CreateSequenceAction, CreateTableAction, DropColumnAction, DropSequenceAction,
    DropTableAction, ModifyDataTypeAction, SequenceSettings, SetDefaultValueAction,
    SetNullableAction,
};
use crate::structure::ObjectReference;
use crate::types::DataType;

/// A single schema edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "camelCase")]
pub enum Change {
    /// Create a table.
    CreateTable {
        /// Table name.
        table: ObjectReference,
        /// Column definitions.
        columns: Vec<ColumnDefinition>,
        /// Primary key column(s).
        primary_key: Vec<String>,
    },

    /// Drop a table.
    DropTable {
        /// Table name.
        table: ObjectReference,
    },

    /// Add a column to a table.
    AddColumn {
        /// Table name.
        table: ObjectReference,
        /// Column definition.
        column: ColumnDefinition,
    },

    /// Drop a column.
    DropColumn {
        /// Qualified column name.
        column: ObjectReference,
    },

    /// Change a column's type.
    ModifyDataType {
        /// Qualified column name.
        column: ObjectReference,
        /// The new type.
        new_data_type: DataType,
        /// The type being replaced (for reversal).
        original: Option<DataType>,
    },

    /// Add or drop a NOT NULL constraint.
    SetNullable {
        /// Qualified column name.
        column: ObjectReference,
        /// Whether NULL becomes allowed.
        nullable: bool,
    },

    /// Set or drop a column default.
    SetDefaultValue {
        /// Qualified column name.
        column: ObjectReference,
        /// New default; `None` drops it.
        default_value: Option<String>,
        /// The default being replaced; `None` means there was none.
        previous: Option<String>,
    },

    /// Turn a column into an identity column.
    AddAutoIncrement {
        /// Qualified column name.
        column: ObjectReference,
        /// Column type.
        data_type: Option<DataType>,
        /// First generated value.
        start_with: Option<i64>,
        /// Step between generated values.
        increment_by: Option<i64>,
    },

    /// Create a sequence.
    CreateSequence {
        /// Sequence name.
        sequence: ObjectReference,
        /// First value.
        start_value: Option<i64>,
        /// Remaining settings.
        settings: SequenceSettings,
    },

    /// Alter sequence settings.
    AlterSequence {
        /// Sequence name.
        sequence: ObjectReference,
        /// Settings to apply.
        settings: SequenceSettings,
        /// Prior values of the same settings (for reversal).
        original: Option<SequenceSettings>,
    },

    /// Drop a sequence.
    DropSequence {
        /// Sequence name.
        sequence: ObjectReference,
    },
}

impl Change {
    /// Returns the change that undoes this one, when the original state is
    /// known.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        match self {
            Self::CreateTable { table, .. } => Some(Self::DropTable {
                table: table.clone(),
            }),

            // Cannot reverse without the dropped definition
            Self::DropTable { .. } | Self::DropColumn { .. } | Self::DropSequence { .. } => None,

            Self::AddColumn { table, column } => Some(Self::DropColumn {
                column: ObjectReference::new(
                    table
                        .as_list()
                        .iter()
                        .cloned()
                        .chain(std::iter::once(column.name.clone())),
                ),
            }),

            Self::ModifyDataType {
                column,
                new_data_type,
                original,
            } => original.as_ref().map(|original| Self::ModifyDataType {
                column: column.clone(),
                new_data_type: original.clone(),
                original: Some(new_data_type.clone()),
            }),

            Self::SetNullable { column, nullable } => Some(Self::SetNullable {
                column: column.clone(),
                nullable: !nullable,
            }),

            Self::SetDefaultValue {
                column,
                default_value,
                previous,
            } => Some(Self::SetDefaultValue {
                column: column.clone(),
                default_value: previous.clone(),
                previous: default_value.clone(),
            }),

            Self::AddAutoIncrement { .. } => None,

            Self::CreateSequence { sequence, .. } => Some(Self::DropSequence {
                sequence: sequence.clone(),
            }),

            Self::AlterSequence {
                sequence,
                settings,
                original,
            } => original.as_ref().map(|original| Self::AlterSequence {
                sequence: sequence.clone(),
                settings: original.clone(),
                original: Some(settings.clone()),
            }),
        }
    }

    /// Returns whether this change can be undone.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.inverse().is_some()
    }

    /// Returns a human-readable description of this change.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CreateTable { table, .. } => format!("Create table '{table}'"),
            Self::DropTable { table } => format!("Drop table '{table}'"),
            Self::AddColumn { table, column } => {
                format!("Add column '{}' to table '{table}'", column.name)
            }
            Self::DropColumn { column } => format!("Drop column '{column}'"),
            Self::ModifyDataType {
                column,
                new_data_type,
                ..
            } => format!("Modify data type of '{column}' to {new_data_type}"),
            Self::SetNullable { column, nullable } => {
                if *nullable {
                    format!("Drop not-null constraint on '{column}'")
                } else {
                    format!("Add not-null constraint on '{column}'")
                }
            }
            Self::SetDefaultValue {
                column,
                default_value,
                ..
            } => match default_value {
                Some(value) => format!("Set default of '{column}' to {value}"),
                None => format!("Drop default of '{column}'"),
            },
            Self::AddAutoIncrement { column, .. } => {
                format!("Add auto-increment to '{column}'")
            }
            Self::CreateSequence { sequence, .. } => format!("Create sequence '{sequence}'"),
            Self::AlterSequence { sequence, .. } => format!("Alter sequence '{sequence}'"),
            Self::DropSequence { sequence } => format!("Drop sequence '{sequence}'"),
        }
    }

    /// Lowers this change to dispatchable actions.
    #[must_use]
    pub fn to_actions(&self) -> Vec<Action> {
        let action = match self {
            Self::CreateTable {
                table,
                columns,
                primary_key,
            } => Action::CreateTable(CreateTableAction {
                table_name: Some(table.clone()),
                columns: columns.clone(),
                primary_key: primary_key.clone(),
            }),
            Self::DropTable { table } => Action::DropTable(DropTableAction {
                table_name: Some(table.clone()),
                cascade: false,
            }),
            Self::AddColumn { table, column } => Action::AddColumn(AddColumnAction {
                table_name: Some(table.clone()),
                column: column.clone(),
            }),
            Self::DropColumn { column } => Action::DropColumn(DropColumnAction {
                column_name: Some(column.clone()),
            }),
            Self::ModifyDataType {
                column,
                new_data_type,
                ..
            } => Action::ModifyDataType(ModifyDataTypeAction {
                column_name: Some(column.clone()),
                new_data_type: Some(new_data_type.clone()),
            }),
            Self::SetNullable { column, nullable } => Action::SetNullable(SetNullableAction {
                column_name: Some(column.clone()),
                nullable: *nullable,
            }),
            Self::SetDefaultValue {
                column,
                default_value,
                ..
            } => Action::SetDefaultValue(SetDefaultValueAction {
                column_name: Some(column.clone()),
                default_value: default_value.clone(),
            }),
            Self::AddAutoIncrement {
                column,
                data_type,
                start_with,
                increment_by,
            } => Action::AddAutoIncrement(AddAutoIncrementAction {
                column_name: Some(column.clone()),
                column_data_type: data_type.clone(),
                start_with: *start_with,
                increment_by: *increment_by,
            }),
            Self::CreateSequence {
                sequence,
                start_value,
                settings,
            } => Action::CreateSequence(CreateSequenceAction {
                sequence_name: Some(sequence.clone()),
                start_value: *start_value,
                settings: settings.clone(),
            }),
            Self::AlterSequence {
                sequence, settings, ..
            } => Action::AlterSequence(AlterSequenceAction {
                sequence_name: Some(sequence.clone()),
                settings: settings.clone(),
            }),
            Self::DropSequence { sequence } => Action::DropSequence(DropSequenceAction {
                sequence_name: Some(sequence.clone()),
            }),
        };
        vec![action]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(s: &str) -> ObjectReference {
        s.parse().unwrap()
    }

    #[test]
    fn test_alter_sequence_inverse_needs_original() {
        let change = Change::AlterSequence {
            sequence: reference("SEQ"),
            settings: SequenceSettings {
                increment_by: Some(2),
                ..Default::default()
            },
            original: None,
        };
        assert!(!change.is_reversible());

        let change = Change::AlterSequence {
            sequence: reference("SEQ"),
            settings: SequenceSettings {
                increment_by: Some(2),
                ..Default::default()
            },
            original: Some(SequenceSettings {
                increment_by: Some(1),
                ..Default::default()
            }),
        };
        let Some(Change::AlterSequence { settings, .. }) = change.inverse() else {
            panic!("expected alter sequence inverse");
        };
        assert_eq!(settings.increment_by, Some(1));
    }

    #[test]
    fn test_add_column_inverse_drops_qualified_column() {
        let change = Change::AddColumn {
            table: reference("APP.USER"),
            column: ColumnDefinition::new("EMAIL", DataType::Text),
        };
        assert_eq!(
            change.inverse(),
            Some(Change::DropColumn {
                column: reference("APP.USER.EMAIL")
            })
        );
    }

    #[test]
    fn test_description_and_serialized_tag() {
        let change = Change::SetNullable {
            column: reference("USER.NAME"),
            nullable: false,
        };
        assert_eq!(change.description(), "Add not-null constraint on 'USER.NAME'");
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["change"], "setNullable");
    }
}
