//! Sequence generators.

use crate::action::SequenceSettings;
use crate::diff::{Change, ComparedValue, ObjectDifferences};
use crate::error::Result;
use crate::structure::{ObjectType, ObjectView};

use super::{
    ChangeGenerator, ChangedObjectChangeGenerator, GeneratorContext,
    MissingObjectChangeGenerator, UnexpectedObjectChangeGenerator, PRIORITY_DEFAULT,
};

fn sequence_priority(object_type: ObjectType) -> Option<i32> {
    (object_type == ObjectType::Sequence).then_some(PRIORITY_DEFAULT)
}

fn integer(view: &ObjectView<'_>, attribute: &str) -> Option<i64> {
    view.get(attribute).and_then(|v| v.as_integer())
}

fn boolean(view: &ObjectView<'_>, attribute: &str) -> Option<bool> {
    view.get(attribute).and_then(|v| v.as_bool())
}

/// Creates sequences that only exist in the reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingSequenceChangeGenerator;

impl ChangeGenerator for MissingSequenceChangeGenerator {
    fn name(&self) -> &'static str {
        "MissingSequenceChangeGenerator"
    }

    fn priority(&self, object_type: ObjectType) -> Option<i32> {
        sequence_priority(object_type)
    }

    fn run_before_types(&self) -> &'static [ObjectType] {
        &[ObjectType::Table]
    }
}

impl MissingObjectChangeGenerator for MissingSequenceChangeGenerator {
    fn fix_missing(
        &self,
        missing: &ObjectView<'_>,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>> {
        if !context.comparison_database.supports_sequences() {
            return Ok(None);
        }
        Ok(Some(vec![Change::CreateSequence {
            sequence: context.control.reference(missing),
            start_value: integer(missing, "startValue"),
            settings: SequenceSettings {
                increment_by: integer(missing, "incrementBy"),
                min_value: integer(missing, "minValue"),
                max_value: integer(missing, "maxValue"),
                ordered: boolean(missing, "ordered"),
                cache_size: integer(missing, "cacheSize"),
                will_cycle: boolean(missing, "willCycle"),
            },
        }]))
    }
}

/// Drops sequences that only exist in the comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnexpectedSequenceChangeGenerator;

impl ChangeGenerator for UnexpectedSequenceChangeGenerator {
    fn name(&self) -> &'static str {
        "UnexpectedSequenceChangeGenerator"
    }

    fn priority(&self, object_type: ObjectType) -> Option<i32> {
        sequence_priority(object_type)
    }
}

impl UnexpectedObjectChangeGenerator for UnexpectedSequenceChangeGenerator {
    fn fix_unexpected(
        &self,
        unexpected: &ObjectView<'_>,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>> {
        Ok(Some(vec![Change::DropSequence {
            sequence: context.control.reference(unexpected),
        }]))
    }
}

/// Alters sequences whose settings differ, one change per setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangedSequenceChangeGenerator;

impl ChangeGenerator for ChangedSequenceChangeGenerator {
    fn name(&self) -> &'static str {
        "ChangedSequenceChangeGenerator"
    }

    fn priority(&self, object_type: ObjectType) -> Option<i32> {
        sequence_priority(object_type)
    }
}

/// Writes one attribute's value into the matching setting.
fn assign(settings: &mut SequenceSettings, attribute: &str, value: Option<&ComparedValue>) {
    let integer = value.and_then(ComparedValue::as_integer);
    let boolean = value.and_then(ComparedValue::as_bool);
    match attribute {
        "incrementBy" => settings.increment_by = integer,
        "maxValue" => settings.max_value = integer,
        "cacheSize" => settings.cache_size = integer,
        "ordered" => settings.ordered = boolean,
        "willCycle" => settings.will_cycle = boolean,
        _ => {}
    }
}

impl ChangedObjectChangeGenerator for ChangedSequenceChangeGenerator {
    fn fix_changed(
        &self,
        changed: &ObjectView<'_>,
        differences: &ObjectDifferences,
        context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>> {
        let mut changes = Vec::new();
        for attribute in ["incrementBy", "maxValue", "ordered", "cacheSize", "willCycle"] {
            let Some(difference) = differences.get(attribute).filter(|d| d.is_different()) else {
                continue;
            };
            let mut settings = SequenceSettings::default();
            assign(&mut settings, attribute, difference.reference.as_ref());
            if settings.is_empty() {
                // the reference cleared the setting; ALTER SEQUENCE cannot express that
                continue;
            }
            let mut original = SequenceSettings::default();
            assign(&mut original, attribute, difference.comparison.as_ref());
            changes.push(Change::AlterSequence {
                sequence: context.control.reference(changed),
                settings,
                original: (!original.is_empty()).then_some(original),
            });
        }

        if changes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(changes))
        }
    }
}
