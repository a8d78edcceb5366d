//! Diff engine behavior over whole snapshots.

mod common;

use common::{Fixture, UserTable};
use tidemark::action::SequenceSettings;
use tidemark::dialect::{GenericDatabase, PostgresDatabase};
use tidemark::diff::generator::PRIORITY_DATABASE;
use tidemark::diff::{
    compare_snapshots, Change, ChangeGenerator, DiffEngine, DiffOutputControl, GeneratorContext,
    GeneratorRegistry, MissingObjectChangeGenerator,
};
use tidemark::error::{Result, TidemarkError};
use tidemark::logic::ActionEngine;
use tidemark::scope::Scope;
use tidemark::snapshot::DatabaseSnapshot;
use tidemark::structure::{ObjectReference, ObjectType, ObjectView};
use tidemark::types::DataType;

fn diff(reference: &DatabaseSnapshot, comparison: &DatabaseSnapshot) -> Vec<Change> {
    let database = PostgresDatabase::new();
    let context = GeneratorContext::new(reference, comparison, &database, &database);
    DiffEngine::with_core_generators()
        .unwrap()
        .diff_snapshots(&context)
        .unwrap()
}

fn with_sequence(increment_by: i64) -> DatabaseSnapshot {
    let mut fixture = Fixture::new();
    fixture.sequence(increment_by);
    fixture.build()
}

#[test]
fn test_identical_snapshots_produce_nothing() {
    let mut reference = Fixture::new();
    reference.user_table();
    reference.sequence(1);
    let reference = reference.build();
    let mut comparison = Fixture::new();
    comparison.user_table();
    comparison.sequence(1);
    let comparison = comparison.build();

    assert!(compare_snapshots(&reference, &comparison).are_equal());
    assert!(diff(&reference, &comparison).is_empty());
}

#[test]
fn test_single_sequence_attribute_yields_single_change() {
    let changes = diff(&with_sequence(5), &with_sequence(1));
    assert_eq!(
        changes,
        vec![Change::AlterSequence {
            sequence: ObjectReference::new(["SEQ_ID"]),
            settings: SequenceSettings {
                increment_by: Some(5),
                ..Default::default()
            },
            original: Some(SequenceSettings {
                increment_by: Some(1),
                ..Default::default()
            }),
        }]
    );
    assert!(changes[0].is_reversible());
}

#[test]
fn test_each_sequence_attribute_is_its_own_change() {
    let mut reference = Fixture::new();
    let seq = reference.sequence(5);
    reference.builder.set(seq, "willCycle", true).unwrap();
    let changes = diff(&reference.build(), &with_sequence(1));

    assert_eq!(changes.len(), 2);
    let altered: Vec<SequenceSettings> = changes
        .iter()
        .map(|change| match change {
            Change::AlterSequence { settings, .. } => settings.clone(),
            other => panic!("unexpected change: {other:?}"),
        })
        .collect();
    assert_eq!(altered[0].increment_by, Some(5));
    assert_eq!(altered[1].will_cycle, Some(true));
    assert_eq!(altered[1].increment_by, None);
}

#[test]
fn test_changed_column_emits_one_change_per_attribute() {
    let mut reference = Fixture::new();
    let UserTable { name, .. } = reference.user_table();
    reference.builder.set(name, "type", "VARCHAR(200)").unwrap();
    reference.builder.set(name, "nullable", false).unwrap();
    let mut comparison = Fixture::new();
    comparison.user_table();

    let changes = diff(&reference.build(), &comparison.build());
    let column = ObjectReference::new(["USER", "NAME"]);
    assert_eq!(
        changes,
        vec![
            Change::ModifyDataType {
                column: column.clone(),
                new_data_type: DataType::Varchar(200),
                original: Some(DataType::Varchar(100)),
            },
            Change::SetNullable {
                column,
                nullable: false,
            },
        ]
    );
}

/// Adds table `T` with a single column `C`.
fn single_column_table(fixture: &mut Fixture, data_type: Option<&str>, nullable: bool) {
    let b = &mut fixture.builder;
    let table = b.add(ObjectType::Table, "T", Some(fixture.schema)).unwrap();
    let column = b.add(ObjectType::Column, "C", Some(table)).unwrap();
    if let Some(data_type) = data_type {
        b.set(column, "type", data_type).unwrap();
    }
    b.set(column, "nullable", nullable).unwrap();
    b.set(column, "relation", table).unwrap();
    b.push(table, "columns", column).unwrap();
}

#[test]
fn test_untyped_reference_column_keeps_other_changes() {
    let mut reference = Fixture::new();
    single_column_table(&mut reference, None, false);
    let mut comparison = Fixture::new();
    single_column_table(&mut comparison, Some("INT"), true);

    let changes = diff(&reference.build(), &comparison.build());
    assert_eq!(
        changes,
        vec![Change::SetNullable {
            column: ObjectReference::new(["T", "C"]),
            nullable: false,
        }]
    );
}

#[test]
fn test_type_spelling_alone_is_not_a_change() {
    let mut reference = Fixture::new();
    let UserTable { id, .. } = reference.user_table();
    reference.builder.set(id, "type", "bigint").unwrap();
    let reference = reference.build();
    let mut comparison = Fixture::new();
    comparison.user_table();
    let comparison = comparison.build();

    assert_eq!(compare_snapshots(&reference, &comparison).changed().len(), 1);
    assert!(diff(&reference, &comparison).is_empty());
}

#[test]
fn test_snapshots_match_across_catalog_names() {
    let mut reference = Fixture::in_catalog("DB");
    reference.user_table();
    reference.sequence(1);
    let reference = reference.build();
    let mut comparison = Fixture::in_catalog("PROD");
    comparison.user_table();
    comparison.sequence(1);
    let comparison = comparison.build();

    assert!(compare_snapshots(&reference, &comparison).are_equal());
    assert!(diff(&reference, &comparison).is_empty());

    let mut reference = Fixture::in_catalog("DB");
    let UserTable { name, .. } = reference.user_table();
    reference.builder.set(name, "nullable", false).unwrap();
    let changes = diff(&reference.build(), &comparison);
    assert_eq!(
        changes,
        vec![Change::SetNullable {
            column: ObjectReference::new(["USER", "NAME"]),
            nullable: false,
        }]
    );
}

#[test]
fn test_surplus_objects_sharing_a_name_are_unexpected() {
    let mut reference = Fixture::new();
    reference.user_table();
    let reference = reference.build();

    let mut comparison = Fixture::new();
    comparison.user_table();
    let prod = comparison
        .builder
        .add(ObjectType::Catalog, "PROD", None)
        .unwrap();
    let prod_app = comparison
        .builder
        .add(ObjectType::Schema, "APP", Some(prod))
        .unwrap();
    comparison.user_table_in(prod_app);
    let comparison = comparison.build();

    let result = compare_snapshots(&reference, &comparison);
    assert!(result.missing().is_empty());
    assert!(result.changed().is_empty());
    let unexpected: Vec<String> = result.unexpected().iter().map(ObjectView::describe).collect();
    assert_eq!(unexpected.len(), 6, "{unexpected:?}");
    assert!(unexpected.iter().all(|d| d.contains("PROD")), "{unexpected:?}");
    assert!(unexpected.contains(&"Table PROD.APP.USER".to_string()));
}

#[test]
fn test_missing_sequence_comes_before_missing_table() {
    let mut reference = Fixture::new();
    reference.user_table();
    reference.sequence(1);
    let changes = diff(&reference.build(), &Fixture::new().build());

    assert_eq!(changes.len(), 2);
    assert!(matches!(changes[0], Change::CreateSequence { .. }));
    assert!(matches!(changes[1], Change::CreateTable { .. }));
}

#[test]
fn test_output_control_adds_schema() {
    let mut reference = Fixture::new();
    let UserTable { name, .. } = reference.user_table();
    reference.builder.set(name, "nullable", false).unwrap();
    let reference = reference.build();
    let mut comparison = Fixture::new();
    comparison.user_table();
    let comparison = comparison.build();

    let database = GenericDatabase::new();
    let context = GeneratorContext::new(&reference, &comparison, &database, &database)
        .control(DiffOutputControl::new().include_schema(true));
    let changes = DiffEngine::with_core_generators()
        .unwrap()
        .diff_snapshots(&context)
        .unwrap();
    assert_eq!(
        changes,
        vec![Change::SetNullable {
            column: ObjectReference::new(["APP", "USER", "NAME"]),
            nullable: false,
        }]
    );

    let engine = ActionEngine::default();
    let scope = Scope::new(std::sync::Arc::new(database));
    let statements: Vec<String> = changes[0]
        .to_actions()
        .iter()
        .flat_map(|action| engine.execute(action, &scope).unwrap().statements)
        .collect();
    assert_eq!(
        statements,
        vec!["ALTER TABLE APP.USER ALTER COLUMN NAME SET NOT NULL"]
    );
}

/// Generator with configurable ordering and outcome.
struct Custom {
    handles: ObjectType,
    priority: i32,
    before: &'static [ObjectType],
    outcome: fn() -> Result<Option<Vec<Change>>>,
}

impl ChangeGenerator for Custom {
    fn name(&self) -> &'static str {
        "Custom"
    }

    fn priority(&self, object_type: ObjectType) -> Option<i32> {
        (object_type == self.handles).then_some(self.priority)
    }

    fn run_before_types(&self) -> &'static [ObjectType] {
        self.before
    }
}

impl MissingObjectChangeGenerator for Custom {
    fn fix_missing(
        &self,
        _missing: &ObjectView<'_>,
        _context: &GeneratorContext<'_>,
    ) -> Result<Option<Vec<Change>>> {
        (self.outcome)()
    }
}

fn nothing() -> Result<Option<Vec<Change>>> {
    Ok(None)
}

fn handled_empty() -> Result<Option<Vec<Change>>> {
    Ok(Some(Vec::new()))
}

fn broken() -> Result<Option<Vec<Change>>> {
    Err(TidemarkError::Connection("catalog query failed".to_string()))
}

#[test]
fn test_contradictory_ordering_is_rejected() {
    let mut registry = GeneratorRegistry::new();
    registry
        .register_missing(Custom {
            handles: ObjectType::Table,
            priority: 1,
            before: &[ObjectType::Index],
            outcome: nothing,
        })
        .register_missing(Custom {
            handles: ObjectType::Index,
            priority: 1,
            before: &[ObjectType::Table],
            outcome: nothing,
        });

    let err = DiffEngine::new(registry).unwrap_err();
    match err {
        TidemarkError::OrderingConflict { types } => assert_eq!(types, ["Index", "Table"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_first_some_ends_the_chain() {
    let reference = with_sequence(1);
    let comparison = Fixture::new().build();
    let database = PostgresDatabase::new();
    let context = GeneratorContext::new(&reference, &comparison, &database, &database);

    let mut passing = GeneratorRegistry::with_core_generators();
    passing.register_missing(Custom {
        handles: ObjectType::Sequence,
        priority: PRIORITY_DATABASE,
        before: &[],
        outcome: nothing,
    });
    let changes = DiffEngine::new(passing)
        .unwrap()
        .diff_snapshots(&context)
        .unwrap();
    assert_eq!(changes.len(), 1);

    let mut claiming = GeneratorRegistry::with_core_generators();
    claiming.register_missing(Custom {
        handles: ObjectType::Sequence,
        priority: PRIORITY_DATABASE,
        before: &[],
        outcome: handled_empty,
    });
    let changes = DiffEngine::new(claiming)
        .unwrap()
        .diff_snapshots(&context)
        .unwrap();
    assert!(changes.is_empty());
}

#[test]
fn test_generator_failure_carries_object_identity() {
    let reference = with_sequence(1);
    let comparison = Fixture::new().build();
    let database = PostgresDatabase::new();
    let context = GeneratorContext::new(&reference, &comparison, &database, &database);

    let mut registry = GeneratorRegistry::with_core_generators();
    registry.register_missing(Custom {
        handles: ObjectType::Sequence,
        priority: PRIORITY_DATABASE,
        before: &[],
        outcome: broken,
    });
    let err = DiffEngine::new(registry)
        .unwrap()
        .diff_snapshots(&context)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Change generation failed for Sequence DB.APP.SEQ_ID: Connection error: catalog query failed"
    );
}
