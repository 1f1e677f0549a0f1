//! Status synchronization tests.

use super::fixtures::{Harness, column_with_status, harness, owned};
use crate::kanban::{
    domain::HistorySource,
    ports::BoardEvent,
    services::{AddColumnRequest, ErrorKind, SetStatusRequest},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_change_appends_into_the_bound_column(harness: Harness) {
    let board = harness.board().await;
    let todo = column_with_status(&board, "todo");
    let review = column_with_status(&board, "review");
    let a = harness.task_in(board.board.id(), todo.id(), "A").await;
    harness.task_in(board.board.id(), todo.id(), "B").await;
    harness.task_in(board.board.id(), review.id(), "R1").await;

    let updated = harness
        .tasks
        .set_status(&harness.manager, SetStatusRequest::new(a.id(), "review"))
        .await
        .expect("status change should succeed");

    assert_eq!(updated.column_id(), review.id());
    assert_eq!(updated.status().as_str(), "review");
    assert_eq!(
        harness.column_titles(review.id()).await,
        owned(&[("R1", 0), ("A", 1)])
    );
    assert_eq!(harness.column_titles(todo.id()).await, owned(&[("B", 0)]));
    assert_eq!(harness.history_len(a.id()).await, 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unchanged_status_is_a_no_op(harness: Harness) {
    let board = harness.board().await;
    let todo = column_with_status(&board, "todo");
    let a = harness.task_in(board.board.id(), todo.id(), "A").await;
    assert!(!harness.notifier.take().is_empty());

    let unchanged = harness
        .tasks
        .set_status(&harness.manager, SetStatusRequest::new(a.id(), "todo"))
        .await
        .expect("no-op should succeed");

    assert_eq!(unchanged, a);
    assert_eq!(harness.history_len(a.id()).await, 1);
    assert!(harness.notifier.events().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_without_a_bound_column_is_kept_in_place(harness: Harness) {
    let board = harness.board().await;
    let todo = column_with_status(&board, "todo");
    let a = harness.task_in(board.board.id(), todo.id(), "A").await;

    let orphaned = harness
        .tasks
        .set_status(
            &harness.manager,
            SetStatusRequest::new(a.id(), "blocked").with_source(HistorySource::Integration),
        )
        .await
        .expect("status change should succeed");

    assert_eq!(orphaned.status().as_str(), "blocked");
    assert_eq!(orphaned.column_id(), todo.id());
    assert_eq!(orphaned.position(), 0);
    assert!(harness.notifier.events().iter().any(|event| matches!(
        event,
        BoardEvent::TaskUpdated { task_id, .. } if *task_id == a.id()
    )));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn entering_reopened_counts_each_reopening(harness: Harness) {
    let board = harness.board().await;
    let todo = column_with_status(&board, "todo");
    let a = harness.task_in(board.board.id(), todo.id(), "A").await;
    let reopened = harness
        .columns
        .add_column(
            &harness.manager,
            board.board.id(),
            AddColumnRequest::new("Reopened", "reopened"),
        )
        .await
        .expect("column should be added");

    for status in ["done", "reopened", "reopened", "done", "reopened"] {
        harness
            .tasks
            .set_status(&harness.manager, SetStatusRequest::new(a.id(), status))
            .await
            .expect("status change should succeed");
    }

    let task = harness.fetch(a.id()).await;
    assert_eq!(task.reopened_count(), 2);
    assert_eq!(task.column_id(), reopened.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn locked_tasks_keep_their_status(harness: Harness) {
    let board = harness.board().await;
    let todo = column_with_status(&board, "todo");
    let a = harness.task_in(board.board.id(), todo.id(), "A").await;
    harness
        .tasks
        .set_locked(&harness.manager, a.id(), true)
        .await
        .expect("lock should succeed");

    let err = harness
        .tasks
        .set_status(&harness.manager, SetStatusRequest::new(a.id(), "done"))
        .await
        .expect_err("locked task must keep its status");

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(harness.fetch(a.id()).await.status().as_str(), "todo");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_statuses_are_rejected(harness: Harness) {
    let board = harness.board().await;
    let todo = column_with_status(&board, "todo");
    let a = harness.task_in(board.board.id(), todo.id(), "A").await;

    let err = harness
        .tasks
        .set_status(&harness.manager, SetStatusRequest::new(a.id(), "done!"))
        .await
        .expect_err("status must be snake_case");

    assert_eq!(err.kind(), ErrorKind::Validation);
}
