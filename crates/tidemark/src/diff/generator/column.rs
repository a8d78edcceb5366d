//! Column generators.

use tracing::debug;

use crate::action::ColumnDefinition;
use crate::diff::{Change, ObjectDifferences};
use crate::error::{Result, TidemarkError};
use crate::structure::{AttributeValue, ObjectReference, ObjectType, ObjectView};
use crate::types::DataType;

use super::{
    ChangeGenerator, ChangedObjectChangeGenerator, GeneratorContext,
    MissingObjectChangeGenerator, UnexpectedObjectChangeGenerator, PRIORITY_DEFAULT,
};

fn column_priority(object_type: ObjectType) -> Option<i32> {
    (object_type == ObjectType::Column).then_some(PRIORITY_DEFAULT)
}

/// Columns of views follow the view definition and are never altered.
fn belongs_to_view(column: &ObjectView<'_>) -> bool {
    column
        .container()
        .is_some_and(|relation| relation.object_type() == ObjectType::View)
}

fn parse_type(text: &str) -> DataType {
    match text.parse::<DataType>() {
        Ok(data_type) => data_type,
        Err(never) => match never {},
    }
}

fn data_type(column: &ObjectView<'_>) -> Option<DataType> {
    column
        .get("type")
        .and_then(AttributeValue::as_text)
        .map(parse_type)
}

fn default_value(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::Text(text) => Some(text.clone()),
        AttributeValue::Integer(i) => Some(i.to_string()),
        AttributeValue::Boolean(b) => Some(b.to_string()),
        AttributeValue::Object(_) | AttributeValue::Collection(_) => None,
    }
}

/// Builds a column definition from a captured column.
pub(super) fn column_definition(column: &ObjectView<'_>) -> Result<ColumnDefinition> {
    let data_type = data_type(column).ok_or_else(|| {
        TidemarkError::InvalidSnapshot(format!("column '{}' has no type", column.reference()))
    })?;
    Ok(ColumnDefinition {
        name: column.name().to_string(),
        data_type,
        nullable: column
            .get("nullable")
            .and_then(AttributeValue::as_bool)
            .unwrap_or(true),
        default_value: column.get("defaultValue").and_then(default_value),
        auto_increment: column
            .get("autoIncrement")
            .and_then(AttributeValue::as_bool)
            .unwrap_or(false),
    })
}

/// Adds columns that only exist in the reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingColumnChangeGenerator;

impl ChangeGenerator for MissingColumnChangeGenerator {
    fn name(&self) -> &'static str {
        "MissingColumnChangeGenerator"
    }

    fn priority(&self, object_type: ObjectType) -> Option<i32> {
        column_priority(object_type)
    }

    fn run_after_types(&self) -> &'static [ObjectType] {
        &[ObjectType::Table]
    }
}

impl MissingObjectChangeGenerator for MissingColumnChangeGenerator {
    fn fix_missing(
        &self,
        missing: &ObjectView<'_>,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>> {
        if belongs_to_view(missing) {
            return Ok(None);
        }
        let Some(table) = missing.container() else {
            return Ok(None);
        };
        if !context.in_comparison(&table) {
            // created along with its table
            return Ok(Some(Vec::new()));
        }
        Ok(Some(vec![Change::AddColumn {
            table: context.control.reference(&table),
            column: column_definition(missing)?,
        }]))
    }
}

/// Drops columns that only exist in the comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnexpectedColumnChangeGenerator;

impl ChangeGenerator for UnexpectedColumnChangeGenerator {
    fn name(&self) -> &'static str {
        "UnexpectedColumnChangeGenerator"
    }

    fn priority(&self, object_type: ObjectType) -> Option<i32> {
        column_priority(object_type)
    }

    fn run_after_types(&self) -> &'static [ObjectType] {
        &[ObjectType::Table]
    }
}

impl UnexpectedObjectChangeGenerator for UnexpectedColumnChangeGenerator {
    fn fix_unexpected(
        &self,
        unexpected: &ObjectView<'_>,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>> {
        if belongs_to_view(unexpected) {
            return Ok(None);
        }
        let Some(table) = unexpected.container() else {
            return Ok(None);
        };
        if !context.in_reference(&table) {
            // dropped along with its table
            return Ok(Some(Vec::new()));
        }
        Ok(Some(vec![Change::DropColumn {
            column: context.control.reference(unexpected),
        }]))
    }
}

/// Reconciles type, nullability, default and auto-increment of a column,
/// one change per attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangedColumnChangeGenerator;

impl ChangeGenerator for ChangedColumnChangeGenerator {
    fn name(&self) -> &'static str {
        "ChangedColumnChangeGenerator"
    }

    fn priority(&self, object_type: ObjectType) -> Option<i32> {
        column_priority(object_type)
    }

    fn run_after_types(&self) -> &'static [ObjectType] {
        &[ObjectType::Table]
    }
}

impl ChangedObjectChangeGenerator for ChangedColumnChangeGenerator {
    fn fix_changed(
        &self,
        changed: &ObjectView<'_>,
        differences: &ObjectDifferences,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>> {
        if belongs_to_view(changed) {
            return Ok(None);
        }
        let column: ObjectReference = context.control.reference(changed);
        let mut changes = Vec::new();

        if let Some(difference) = differences.get("type").filter(|d| d.is_different()) {
            let original = difference
                .comparison
                .as_ref()
                .and_then(|v| v.as_text())
                .map(parse_type);
            match data_type(changed) {
                None => debug!(column = %column, "Reference column has no type, skipping type change"),
                // same type, different spelling
                Some(new_data_type) if original.as_ref() == Some(&new_data_type) => {}
                Some(new_data_type) => changes.push(Change::ModifyDataType {
                    column: column.clone(),
                    new_data_type,
                    original,
                }),
            }
        }

        if differences.is_different("nullable") {
            changes.push(Change::SetNullable {
                column: column.clone(),
                nullable: changed
                    .get("nullable")
                    .and_then(AttributeValue::as_bool)
                    .unwrap_or(true),
            });
        }

        if let Some(difference) = differences.get("defaultValue").filter(|d| d.is_different()) {
            changes.push(Change::SetDefaultValue {
                column: column.clone(),
                default_value: changed.get("defaultValue").and_then(default_value),
                previous: difference.comparison.as_ref().map(ToString::to_string),
            });
        }

        if differences.is_different("autoIncrement") {
            let wanted = changed
                .get("autoIncrement")
                .and_then(AttributeValue::as_bool)
                .unwrap_or(false);
            if wanted {
                changes.push(Change::AddAutoIncrement {
                    column: column.clone(),
                    data_type: data_type(changed),
                    start_with: changed.get("startWith").and_then(AttributeValue::as_integer),
                    increment_by: changed.get("incrementBy").and_then(AttributeValue::as_integer),
                });
            } else {
                debug!(column = %column, "Cannot remove auto-increment, skipping");
            }
        }

        if changes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(changes))
        }
    }
}
