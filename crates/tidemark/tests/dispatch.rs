//! Dispatch engine behavior across the logic catalog.

mod common;

use std::sync::Arc;

use common::{generic_scope, postgres_scope, sqlite_scope, Fixture, StubLogic};
use tidemark::action::{
    Action, ActionFamily, ActionKind, AddAutoIncrementAction, DropColumnAction, DropTableAction,
    SelectDataAction, Verdict,
};
use tidemark::connection::SnapshotConnection;
use tidemark::error::TidemarkError;
use tidemark::logic::core::ExecuteSqlLogic;
use tidemark::logic::{
    ActionEngine, ActionMatch, EngineOptions, LogicRegistry, PRIORITY_DEFAULT, PRIORITY_FALLBACK,
};
use tidemark::runner::{ActionRunner, RunOutcome};
use tidemark::structure::ObjectReference;
use tidemark::types::DataType;

fn select_data() -> Action {
    Action::SelectData(SelectDataAction::default())
}

#[test]
fn test_resolution_is_deterministic() {
    let engine = ActionEngine::default();
    for _ in 0..5 {
        let generic = engine
            .resolve(ActionKind::AddAutoIncrement, &generic_scope())
            .unwrap();
        assert_eq!(generic.name(), "AddAutoIncrementLogic");

        let postgres = engine
            .resolve(ActionKind::AddAutoIncrement, &postgres_scope())
            .unwrap();
        assert_eq!(postgres.name(), "AddAutoIncrementPostgresLogic");
    }
}

#[test]
fn test_priority_tie_is_configuration_error() {
    let mut registry = LogicRegistry::new();
    registry
        .register(StubLogic::new(
            "beta",
            ActionMatch::Kind(ActionKind::SelectData),
            PRIORITY_DEFAULT,
        ))
        .register(StubLogic::new(
            "alpha",
            ActionMatch::Family(ActionFamily::Query),
            PRIORITY_DEFAULT,
        ));
    let engine = ActionEngine::new(registry);

    let err = engine
        .resolve(ActionKind::SelectData, &generic_scope())
        .err()
        .unwrap();
    assert!(matches!(err, TidemarkError::Configuration(_)));
    assert!(err.to_string().contains("alpha, beta"), "{err}");
    assert!(!err.is_recoverable());
}

#[test]
fn test_scope_opt_out_falls_back() {
    let mut registry = LogicRegistry::new();
    registry
        .register(
            StubLogic::new("special", ActionMatch::Kind(ActionKind::DropTable), 9)
                .only_on("postgresql"),
        )
        .register(StubLogic::new(
            "fallback",
            ActionMatch::Family(ActionFamily::Drop),
            PRIORITY_FALLBACK,
        ));
    let engine = ActionEngine::new(registry);

    let on_generic = engine.resolve(ActionKind::DropTable, &generic_scope()).unwrap();
    assert_eq!(on_generic.name(), "fallback");
    let on_postgres = engine
        .resolve(ActionKind::DropTable, &postgres_scope())
        .unwrap();
    assert_eq!(on_postgres.name(), "special");
}

#[test]
fn test_sqlite_has_no_auto_increment_logic() {
    let engine = ActionEngine::default();
    let err = engine
        .resolve(ActionKind::AddAutoIncrement, &sqlite_scope())
        .err()
        .unwrap();
    match &err {
        TidemarkError::NotSupported { action, database } => {
            assert_eq!(action, "addAutoIncrement");
            assert_eq!(database, "sqlite");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_recoverable());
}

#[test]
fn test_delegation_dag_expands_in_order() {
    let mut registry = LogicRegistry::new();
    registry
        .register(
            StubLogic::new("drop-column", ActionMatch::Kind(ActionKind::DropColumn), 1)
                .delegating(vec![
                    Action::execute_sql("SELECT 'first'"),
                    select_data(),
                    select_data(),
                    Action::execute_sql("SELECT 'last'"),
                ]),
        )
        .register(
            StubLogic::new("select", ActionMatch::Kind(ActionKind::SelectData), 1)
                .delegating(vec![Action::execute_sql("SELECT 'shared'")]),
        )
        .register(ExecuteSqlLogic);
    let engine = ActionEngine::new(registry);

    let result = engine
        .execute(
            &Action::DropColumn(DropColumnAction::default()),
            &generic_scope(),
        )
        .unwrap();
    assert_eq!(
        result.statements,
        vec![
            "SELECT 'first'",
            "SELECT 'shared'",
            "SELECT 'shared'",
            "SELECT 'last'"
        ]
    );
}

#[test]
fn test_delegation_cycle_is_reported() {
    let mut registry = LogicRegistry::new();
    registry
        .register(
            StubLogic::new("drop-column", ActionMatch::Kind(ActionKind::DropColumn), 1)
                .delegating(vec![Action::DropTable(DropTableAction::default())]),
        )
        .register(
            StubLogic::new("drop-table", ActionMatch::Kind(ActionKind::DropTable), 1)
                .delegating(vec![Action::DropColumn(DropColumnAction::default())]),
        );
    let engine =
        ActionEngine::new(registry).with_options(EngineOptions::new().max_delegation_depth(5));

    let err = engine
        .execute(
            &Action::DropColumn(DropColumnAction::default()),
            &generic_scope(),
        )
        .unwrap_err();
    match err {
        TidemarkError::DelegationLoop { depth, .. } => assert_eq!(depth, 5),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_validation_reports_every_missing_field() {
    let engine = ActionEngine::default();
    let action = Action::AddAutoIncrement(AddAutoIncrementAction::default());

    let errors = engine.validate(&action, &generic_scope()).unwrap();
    assert_eq!(
        errors.errors(),
        ["columnName is required", "columnDataType is required"]
    );

    let err = ActionRunner::new(&engine)
        .run(&action, &generic_scope())
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("columnName is required"), "{message}");
    assert!(message.contains("columnDataType is required"), "{message}");
}

#[test]
fn test_failing_status_check_is_unknown() {
    let mut registry = LogicRegistry::new();
    registry.register(
        StubLogic::new("flaky", ActionMatch::Kind(ActionKind::SelectData), 1).failing_status(),
    );
    let engine = ActionEngine::new(registry);

    let status = engine
        .check_status(&select_data(), &generic_scope())
        .unwrap();
    assert_eq!(status.verdict(), Verdict::Unknown);
    assert!(status
        .reasons()
        .iter()
        .any(|reason| reason.contains("connection reset by peer")));
}

#[test]
fn test_status_without_connection_is_unknown() {
    let engine = ActionEngine::default();
    let action = Action::add_auto_increment("APP.USER.ID", DataType::BigInt);
    let status = engine.check_status(&action, &generic_scope()).unwrap();
    assert_eq!(status.verdict(), Verdict::Unknown);
    assert!(!status.reasons().is_empty());
}

#[test]
fn test_add_auto_increment_delegates_to_alter_column() {
    let engine = ActionEngine::default();
    let action = Action::add_auto_increment("APP.USER.ID", DataType::BigInt);

    let result = engine.execute_once(&action, &generic_scope()).unwrap();
    let delegated = result.delegated().expect("delegate result");
    assert_eq!(delegated.len(), 1);
    let Action::AlterColumn(alter) = &delegated[0] else {
        panic!("expected alter column, got {:?}", delegated[0]);
    };
    assert_eq!(
        alter.column_name,
        Some(ObjectReference::new(["APP", "USER", "ID"]))
    );
    assert_eq!(alter.clauses.text("dataType").as_deref(), Some("BIGINT"));
    assert_eq!(
        alter.clauses.text("autoIncrement").as_deref(),
        Some("GENERATED BY DEFAULT AS IDENTITY")
    );
}

#[test]
fn test_add_auto_increment_on_postgres() {
    let engine = ActionEngine::default();
    let action = Action::add_auto_increment("APP.USER.ID", DataType::BigInt);
    let result = engine.execute(&action, &postgres_scope()).unwrap();
    assert_eq!(
        result.statements,
        vec![
            r#"ALTER TABLE "APP"."USER" ALTER COLUMN "ID" TYPE BIGINT"#,
            r#"ALTER TABLE "APP"."USER" ALTER COLUMN "ID" ADD GENERATED BY DEFAULT AS IDENTITY"#,
        ]
    );
}

#[test]
fn test_runner_applies_then_skips() {
    let mut fixture = Fixture::new();
    fixture.user_table();
    let connection = Arc::new(SnapshotConnection::new(fixture.build()));
    let scope = generic_scope().with_connection(connection.clone());
    let engine = ActionEngine::default();
    let runner = ActionRunner::new(&engine);

    let action = Action::add_auto_increment("APP.USER.ID", DataType::BigInt);
    let outcome = runner.run(&action, &scope).unwrap();
    assert!(matches!(outcome, RunOutcome::Executed { .. }));
    assert_eq!(
        connection.executed(),
        vec!["ALTER TABLE APP.USER ALTER COLUMN ID BIGINT GENERATED BY DEFAULT AS IDENTITY"]
    );

    let mut applied = Fixture::new();
    let user = applied.user_table();
    applied.builder.set(user.id, "autoIncrement", true).unwrap();
    let connection = Arc::new(SnapshotConnection::new(applied.build()));
    let scope = generic_scope().with_connection(connection.clone());
    let outcome = runner.run(&action, &scope).unwrap();
    assert!(matches!(outcome, RunOutcome::Skipped(_)));
    assert!(outcome.statements().is_empty());
    assert!(connection.executed().is_empty());
}

#[test]
fn test_ambiguous_column_is_never_skipped() {
    let mut fixture = Fixture::new();
    let other = fixture.add_schema("OTHER");
    let other_user = fixture.user_table_in(other);
    fixture
        .builder
        .set(other_user.id, "autoIncrement", true)
        .unwrap();
    fixture.user_table();
    let connection = Arc::new(SnapshotConnection::new(fixture.build()));
    let scope = generic_scope().with_connection(connection.clone());
    let engine = ActionEngine::default();

    let partial = Action::add_auto_increment("USER.ID", DataType::BigInt);
    let status = engine.check_status(&partial, &scope).unwrap();
    assert_eq!(status.verdict(), Verdict::Unknown);
    assert!(status
        .reasons()
        .iter()
        .any(|reason| reason.contains("ambiguous")));

    let qualified = Action::add_auto_increment("APP.USER.ID", DataType::BigInt);
    let status = engine.check_status(&qualified, &scope).unwrap();
    assert_eq!(status.verdict(), Verdict::Incorrect);

    let outcome = ActionRunner::new(&engine).run(&partial, &scope).unwrap();
    assert!(matches!(outcome, RunOutcome::Executed { .. }));
    assert_eq!(connection.executed().len(), 1);
}
