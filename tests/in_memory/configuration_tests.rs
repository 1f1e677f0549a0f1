//! In-memory integration tests for configured board templates.

use super::helpers::{Engine, column_for};
use kanban_engine::kanban::{
    adapters::policy::RoleAccessPolicy,
    config::{KanbanConfig, KanbanConfigError},
};
use rstest::rstest;

const OPERATIONS_CONFIG: &str = r##"{
    "default_columns": [
        { "name": "Inbox", "status": "inbox" },
        { "name": "Shipped", "status": "shipped", "color": "#198754" }
    ],
    "task_code_prefix": "OPS"
}"##;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn boards_are_seeded_from_the_configured_template() -> eyre::Result<()> {
    let config = KanbanConfig::from_json_str(OPERATIONS_CONFIG)?;
    let engine = Engine::with(config, RoleAccessPolicy::new());

    let board = engine.board("Operations").await?;
    let statuses: Vec<_> = board
        .columns
        .iter()
        .map(|snapshot| snapshot.column.status().as_str().to_owned())
        .collect();
    eyre::ensure!(statuses == ["inbox", "shipped"], "unexpected columns {statuses:?}");

    let inbox = column_for(&board, "inbox")?;
    let first = engine.task(&board, inbox, "Rotate keys").await?;
    let second = engine.task(&board, inbox, "Patch hosts").await?;
    eyre::ensure!(first.code().as_str() == "OPS-1");
    eyre::ensure!(second.code().as_str() == "OPS-2");
    Ok(())
}

#[rstest]
#[case::duplicate_status(
    r#"{ "default_columns": [
        { "name": "A", "status": "todo" },
        { "name": "B", "status": "todo" }
    ] }"#
)]
#[case::no_columns(r#"{ "default_columns": [] }"#)]
#[case::blank_prefix(r#"{ "task_code_prefix": "  " }"#)]
#[case::empty_pool(r#"{ "max_connections": 0 }"#)]
fn invalid_documents_are_rejected(#[case] document: &str) {
    let result = KanbanConfig::from_json_str(document);
    assert!(
        matches!(
            result,
            Err(KanbanConfigError::DuplicateStatus(_)
                | KanbanConfigError::NoDefaultColumns
                | KanbanConfigError::EmptyCodePrefix
                | KanbanConfigError::InvalidPoolSize)
        ),
        "unexpected result {result:?}"
    );
}
