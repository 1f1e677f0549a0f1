//! In-memory integration tests for the board and task workflow.

use super::helpers::{Engine, column_for, engine};
use kanban_engine::kanban::{
    adapters::policy::RoleAccessPolicy,
    config::KanbanConfig,
    domain::{Actor, ActorRole, HistoryOrder, MemberRole, TaskStatus, UserId},
    ports::BoardEvent,
    services::{AddColumnRequest, ErrorKind, MoveTaskRequest, SetStatusRequest},
};
use eyre::{OptionExt, WrapErr};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_flow_across_columns_and_leave_a_trail(engine: Engine) -> eyre::Result<()> {
    let board = engine.board("Platform").await?;
    let todo = column_for(&board, "todo")?;
    let in_progress = column_for(&board, "in_progress")?;
    let done = column_for(&board, "done")?;

    let blocked = engine
        .columns
        .add_column(
            &engine.manager,
            board.board.id(),
            AddColumnRequest::new("Blocked", "blocked").with_color("#dc3545"),
        )
        .await
        .wrap_err("add blocked column")?;
    eyre::ensure!(blocked.position() == 5, "blocked column should append");

    let first = engine.task(&board, todo, "A").await?;
    engine.task(&board, todo, "B").await?;
    let third = engine.task(&board, todo, "C").await?;

    engine
        .tasks
        .move_task(&engine.manager, MoveTaskRequest::to_position(third.id(), 0))
        .await
        .wrap_err("reorder C to the top")?;
    eyre::ensure!(engine.titles(&board, todo).await? == ["C", "A", "B"]);

    let moved = engine
        .tasks
        .move_task(
            &engine.manager,
            MoveTaskRequest::to_end(first.id()).into_column(in_progress),
        )
        .await
        .wrap_err("move A to in progress")?;
    eyre::ensure!(moved.status().as_str() == "in_progress");
    eyre::ensure!(engine.titles(&board, todo).await? == ["C", "B"]);

    let blocked_task = engine
        .tasks
        .set_status(&engine.manager, SetStatusRequest::new(first.id(), "blocked"))
        .await
        .wrap_err("block A")?;
    eyre::ensure!(blocked_task.column_id() == blocked.id());
    eyre::ensure!(blocked_task.position() == 0);
    eyre::ensure!(engine.titles(&board, in_progress).await?.is_empty());

    let orphaned = engine
        .tasks
        .set_status(&engine.manager, SetStatusRequest::new(third.id(), "archived"))
        .await
        .wrap_err("archive C")?;
    eyre::ensure!(orphaned.column_id() == todo, "orphaned status keeps the column");
    eyre::ensure!(orphaned.status().as_str() == "archived");

    let history = engine
        .tasks
        .list_history(&engine.manager, first.id(), HistoryOrder::Descending)
        .await
        .wrap_err("list history")?;
    eyre::ensure!(history.len() == 3, "created, moved, re-statused: {history:?}");
    let latest = history.first().ok_or_eyre("history is empty")?;
    eyre::ensure!(latest.new_status().as_str() == "blocked");
    eyre::ensure!(latest.after().column_id == blocked.id());

    eyre::ensure!(engine.titles(&board, done).await?.is_empty());
    let events = engine.notifier.events();
    let moved = events.iter().any(|event| {
        matches!(event, BoardEvent::TaskMoved { task_id, .. } if *task_id == first.id())
    });
    eyre::ensure!(moved, "expected a task moved event");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn emptied_columns_can_be_deleted_leaving_a_gap(engine: Engine) -> eyre::Result<()> {
    let board = engine.board("Platform").await?;
    let todo = column_for(&board, "todo")?;
    let review = column_for(&board, "review")?;
    let task = engine.task(&board, review, "Pending review").await?;

    let err = engine
        .columns
        .delete_column(&engine.manager, review)
        .await
        .err()
        .ok_or_eyre("deleting a populated column should fail")?;
    eyre::ensure!(err.kind() == ErrorKind::Conflict);

    engine
        .tasks
        .move_task(&engine.manager, MoveTaskRequest::to_end(task.id()).into_column(todo))
        .await
        .wrap_err("move task out of review")?;
    engine
        .columns
        .delete_column(&engine.manager, review)
        .await
        .wrap_err("delete emptied column")?;

    let positions: Vec<u32> = engine
        .columns
        .list_columns(&engine.manager, board.board.id())
        .await?
        .iter()
        .map(|column| column.position())
        .collect();
    eyre::ensure!(positions == [0, 1, 3, 4], "unexpected positions {positions:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reordering_columns_is_reflected_in_the_board_view(engine: Engine) -> eyre::Result<()> {
    let board = engine.board("Platform").await?;
    let reversed: Vec<_> = board
        .columns
        .iter()
        .rev()
        .map(|snapshot| snapshot.column.id())
        .collect();

    engine
        .columns
        .reorder_columns(&engine.manager, board.board.id(), &reversed)
        .await
        .wrap_err("reorder columns")?;

    let view = engine
        .boards
        .get_board(&engine.manager, board.board.id())
        .await?;
    let order: Vec<_> = view.columns.iter().map(|snapshot| snapshot.column.id()).collect();
    eyre::ensure!(order == reversed);

    let truncated = reversed.get(1..).ok_or_eyre("board has columns")?;
    let err = engine
        .columns
        .reorder_columns(&engine.manager, board.board.id(), truncated)
        .await
        .err()
        .ok_or_eyre("incomplete order should be rejected")?;
    eyre::ensure!(err.kind() == ErrorKind::Validation);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restricted_statuses_need_an_elevated_role() -> eyre::Result<()> {
    let policy = RoleAccessPolicy::new().with_restricted_status(TaskStatus::new("done")?);
    let engine = Engine::with(KanbanConfig::default(), policy);
    let board = engine.board("Platform").await?;
    let todo = column_for(&board, "todo")?;
    let task = engine.task(&board, todo, "Ship it").await?;

    let employee = Actor::new(UserId::new(), ActorRole::Employee);
    engine
        .boards
        .set_member(
            &engine.manager,
            board.board.id(),
            employee.user_id(),
            MemberRole::Member,
        )
        .await
        .wrap_err("enrol employee")?;

    let err = engine
        .tasks
        .set_status(&employee, SetStatusRequest::new(task.id(), "done"))
        .await
        .err()
        .ok_or_eyre("employee should not close tasks")?;
    eyre::ensure!(err.kind() == ErrorKind::Forbidden);

    engine
        .tasks
        .set_status(&employee, SetStatusRequest::new(task.id(), "review"))
        .await
        .wrap_err("employee may move work forward")?;
    let closed = engine
        .tasks
        .set_status(&engine.manager, SetStatusRequest::new(task.id(), "done"))
        .await
        .wrap_err("manager closes the task")?;
    eyre::ensure!(closed.column_id() == column_for(&board, "done")?);
    Ok(())
}
