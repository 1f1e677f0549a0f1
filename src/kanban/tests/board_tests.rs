//! Board, membership, and column sequence tests.

use super::fixtures::{Harness, column_with_status, harness};
use crate::kanban::{
    domain::{Actor, ActorRole, Column, ColumnId, MAX_TITLE_LEN, MemberRole, TaskDraft, UserId},
    ports::{BoardEvent, BoardStore},
    services::{
        AddColumnRequest, CreateTaskRequest, ErrorKind, MoveTaskRequest, UpdateColumnRequest,
    },
};
use rstest::rstest;

fn statuses(columns: &[Column]) -> Vec<(String, u32)> {
    columns
        .iter()
        .map(|column| (column.status().as_str().to_owned(), column.position()))
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_boards_get_the_default_workflow_and_an_admin(harness: Harness) {
    let board = harness.board().await;

    let columns: Vec<_> = board.columns.iter().map(|c| c.column.clone()).collect();
    assert_eq!(
        statuses(&columns),
        vec![
            ("todo".to_owned(), 0),
            ("in_progress".to_owned(), 1),
            ("review".to_owned(), 2),
            ("testing".to_owned(), 3),
            ("done".to_owned(), 4),
        ]
    );
    assert_eq!(board.members.len(), 1);
    let owner = board.members.first().expect("creator is enrolled");
    assert_eq!(owner.user_id(), harness.manager.user_id());
    assert_eq!(owner.role(), MemberRole::Admin);
    assert_eq!(
        harness.notifier.events(),
        vec![BoardEvent::BoardCreated {
            board_id: board.board.id(),
            actor: harness.manager.user_id(),
        }]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn snapshot_orders_columns_and_tasks(harness: Harness) {
    let board = harness.board().await;
    let todo = column_with_status(&board, "todo");
    harness.task_in(board.board.id(), todo.id(), "A").await;
    harness.task_in(board.board.id(), todo.id(), "B").await;

    let snapshot = harness
        .boards
        .get_board(&harness.manager, board.board.id())
        .await
        .expect("board should load");

    assert_eq!(snapshot.task_count(), 2);
    let titles: Vec<&str> = snapshot
        .column(todo.id())
        .expect("todo column")
        .tasks
        .iter()
        .map(|task| task.title())
        .collect();
    assert_eq!(titles, vec!["A", "B"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outsiders_cannot_read_the_board(harness: Harness) {
    let board = harness.board().await;
    let outsider = Actor::new(UserId::new(), ActorRole::Employee);

    let err = harness
        .boards
        .get_board(&outsider, board.board.id())
        .await
        .expect_err("non-members are denied");

    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inactive_boards_reject_changes_until_reactivated(harness: Harness) {
    let board = harness.board().await;
    let board_id = board.board.id();
    let todo = column_with_status(&board, "todo");

    let deactivated = harness
        .boards
        .set_board_active(&harness.manager, board_id, false)
        .await
        .expect("deactivation should succeed");
    assert!(!deactivated.is_active());

    let err = harness
        .columns
        .add_column(&harness.manager, board_id, AddColumnRequest::new("QA", "qa"))
        .await
        .expect_err("inactive board rejects columns");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    harness
        .boards
        .set_board_active(&harness.manager, board_id, true)
        .await
        .expect("reactivation should succeed");
    let task = harness.task_in(board_id, todo.id(), "After").await;
    assert_eq!(task.code().as_str(), "TASK-1");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn renaming_keeps_the_task_sequence(harness: Harness) {
    let board = harness.board().await;
    let board_id = board.board.id();
    let todo = column_with_status(&board, "todo");
    harness.task_in(board_id, todo.id(), "A").await;

    let renamed = harness
        .boards
        .rename_board(&harness.manager, board_id, "Field Operations")
        .await
        .expect("rename should succeed");
    let next = harness.task_in(board_id, todo.id(), "B").await;

    assert_eq!(renamed.name(), "Field Operations");
    assert_eq!(next.code().as_str(), "TASK-2");
}

#[rstest]
#[case::blank("   ".to_owned())]
#[case::overlong("t".repeat(MAX_TITLE_LEN + 1))]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_drafts_do_not_consume_a_task_number(harness: Harness, #[case] title: String) {
    let board = harness.board().await;
    let board_id = board.board.id();
    let todo = column_with_status(&board, "todo");
    let rejected = TaskDraft {
        title,
        ..TaskDraft::default()
    };

    let err = harness
        .tasks
        .create_task(
            &harness.manager,
            CreateTaskRequest::new(board_id, rejected).in_column(todo.id()),
        )
        .await
        .expect_err("invalid titles are rejected");
    let task = harness.task_in(board_id, todo.id(), "Real work").await;

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(task.code().as_str(), "TASK-1");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn the_last_admin_cannot_leave(harness: Harness) {
    let board = harness.board().await;
    let board_id = board.board.id();
    let owner = harness.manager.user_id();

    let err = harness
        .boards
        .remove_member(&harness.manager, board_id, owner)
        .await
        .expect_err("last admin must stay");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let demotion = harness
        .boards
        .set_member(&harness.manager, board_id, owner, MemberRole::Member)
        .await
        .expect_err("last admin cannot be demoted");
    assert_eq!(demotion.kind(), ErrorKind::Conflict);

    let deputy = UserId::new();
    harness
        .boards
        .set_member(&harness.manager, board_id, deputy, MemberRole::Admin)
        .await
        .expect("second admin should be added");
    harness
        .boards
        .remove_member(&harness.manager, board_id, owner)
        .await
        .expect("an admin remains");

    let members = harness
        .store
        .list_members(board_id)
        .await
        .expect("members should load");
    assert_eq!(members.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn members_can_work_but_not_administer(harness: Harness) {
    let board = harness.board().await;
    let board_id = board.board.id();
    let todo = column_with_status(&board, "todo");
    let teammate = Actor::new(UserId::new(), ActorRole::Manager);
    harness
        .boards
        .set_member(&harness.manager, board_id, teammate.user_id(), MemberRole::Member)
        .await
        .expect("member should be added");

    let draft = TaskDraft {
        title: "Member task".to_owned(),
        ..Default::default()
    };
    harness
        .tasks
        .create_task(
            &teammate,
            CreateTaskRequest::new(board_id, draft).in_column(todo.id()),
        )
        .await
        .expect("members create tasks");

    let err = harness
        .boards
        .rename_board(&teammate, board_id, "Hijacked")
        .await
        .expect_err("only board admins rename");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn added_columns_go_to_the_end_and_need_a_free_status(harness: Harness) {
    let board = harness.board().await;
    let board_id = board.board.id();

    let added = harness
        .columns
        .add_column(
            &harness.manager,
            board_id,
            AddColumnRequest::new("Blocked", "blocked").with_color("#dc3545"),
        )
        .await
        .expect("column should be added");
    assert_eq!(added.position(), 5);
    assert_eq!(added.color().as_str(), "#dc3545");

    let duplicate = harness
        .columns
        .add_column(&harness.manager, board_id, AddColumnRequest::new("Doing", "in_progress"))
        .await
        .expect_err("status already bound");
    assert_eq!(duplicate.kind(), ErrorKind::Validation);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repositioning_a_column_renumbers_its_siblings(harness: Harness) {
    let board = harness.board().await;
    let done = column_with_status(&board, "done");

    let moved = harness
        .columns
        .update_column(
            &harness.manager,
            done.id(),
            UpdateColumnRequest::new().with_position(1).with_name("Shipped"),
        )
        .await
        .expect("reposition should succeed");

    assert_eq!(moved.position(), 1);
    assert_eq!(moved.name(), "Shipped");
    assert_eq!(
        statuses(&harness.board_columns(board.board.id()).await),
        vec![
            ("todo".to_owned(), 0),
            ("done".to_owned(), 1),
            ("in_progress".to_owned(), 2),
            ("review".to_owned(), 3),
            ("testing".to_owned(), 4),
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_requires_the_exact_column_set(harness: Harness) {
    let board = harness.board().await;
    let board_id = board.board.id();
    let mut ids: Vec<ColumnId> = board.columns.iter().map(|c| c.column.id()).collect();

    let missing = ids.get(1..).map(<[ColumnId]>::to_vec).unwrap_or_default();
    let err = harness
        .columns
        .reorder_columns(&harness.manager, board_id, &missing)
        .await
        .expect_err("a column is missing");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let mut duplicated = ids.clone();
    duplicated.push(ids.first().copied().expect("seeded columns"));
    let err = harness
        .columns
        .reorder_columns(&harness.manager, board_id, &duplicated)
        .await
        .expect_err("a column is repeated");
    assert_eq!(err.kind(), ErrorKind::Validation);

    ids.reverse();
    let reordered = harness
        .columns
        .reorder_columns(&harness.manager, board_id, &ids)
        .await
        .expect("reorder should succeed");
    let first = reordered.first().expect("columns");
    assert_eq!(first.status().as_str(), "done");
    assert_eq!(first.position(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn non_empty_columns_cannot_be_deleted(harness: Harness) {
    let board = harness.board().await;
    let board_id = board.board.id();
    let review = column_with_status(&board, "review");
    let done = column_with_status(&board, "done");
    let task = harness.task_in(board_id, review.id(), "Pending").await;

    let err = harness
        .columns
        .delete_column(&harness.manager, review.id())
        .await
        .expect_err("column has tasks");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    harness
        .tasks
        .move_task(
            &harness.manager,
            MoveTaskRequest::to_end(task.id()).into_column(done.id()),
        )
        .await
        .expect("move should succeed");
    harness
        .columns
        .delete_column(&harness.manager, review.id())
        .await
        .expect("empty column can be deleted");

    let remaining = statuses(&harness.board_columns(board_id).await);
    assert_eq!(
        remaining,
        vec![
            ("todo".to_owned(), 0),
            ("in_progress".to_owned(), 1),
            ("testing".to_owned(), 3),
            ("done".to_owned(), 4),
        ]
    );
}
