//! Table generators.

use crate::diff::Change;
use crate::error::Result;
use crate::structure::{AttributeValue, ObjectType, ObjectView};

use super::column::column_definition;
use super::{
    ChangeGenerator, GeneratorContext, MissingObjectChangeGenerator,
    UnexpectedObjectChangeGenerator, PRIORITY_DEFAULT,
};

fn table_priority(object_type: ObjectType) -> Option<i32> {
    (object_type == ObjectType::Table).then_some(PRIORITY_DEFAULT)
}

/// The table's columns, in declared order when the table lists them.
fn columns<'a>(table: &ObjectView<'a>) -> Vec<ObjectView<'a>> {
    let snapshot = table.snapshot();
    match table.get("columns") {
        Some(AttributeValue::Collection(items)) => items
            .iter()
            .filter_map(AttributeValue::as_object)
            .filter_map(|id| snapshot.view(id))
            .collect(),
        _ => snapshot
            .of_type(ObjectType::Column)
            .into_iter()
            .filter(|column| column.object().container == Some(table.id()))
            .collect(),
    }
}

/// Names of the primary key columns, if the table has one.
fn primary_key(table: &ObjectView<'_>) -> Vec<String> {
    let Some(key) = table.get_object("primaryKey") else {
        return Vec::new();
    };
    let Some(AttributeValue::Collection(items)) = key.get("columns") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            AttributeValue::Object(id) => key.snapshot().view(*id).map(|c| c.name().to_string()),
            AttributeValue::Text(name) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

/// Creates tables that only exist in the reference, columns included.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingTableChangeGenerator;

impl ChangeGenerator for MissingTableChangeGenerator {
    fn name(&self) -> &'static str {
        "MissingTableChangeGenerator"
    }

    fn priority(&self, object_type: ObjectType) -> Option<i32> {
        table_priority(object_type)
    }
}

impl MissingObjectChangeGenerator for MissingTableChangeGenerator {
    fn fix_missing(
        &self,
        missing: &ObjectView<'_>,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>> {
        let columns = columns(missing)
            .iter()
            .map(column_definition)
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(vec![Change::CreateTable {
            table: context.control.reference(missing),
            columns,
            primary_key: primary_key(missing),
        }]))
    }
}

/// Drops tables that only exist in the comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnexpectedTableChangeGenerator;

impl ChangeGenerator for UnexpectedTableChangeGenerator {
    fn name(&self) -> &'static str {
        "UnexpectedTableChangeGenerator"
    }

    fn priority(&self, object_type: ObjectType) -> Option<i32> {
        table_priority(object_type)
    }
}

impl UnexpectedObjectChangeGenerator for UnexpectedTableChangeGenerator {
    fn fix_unexpected(
        &self,
        unexpected: &ObjectView<'_>,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>> {
        Ok(Some(vec![Change::DropTable {
            table: context.control.reference(unexpected),
        }]))
    }
}
