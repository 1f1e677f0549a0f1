//! In-memory integration tests for the time ledger.

use super::helpers::{Engine, column_for, engine};
use chrono::{Duration, Utc};
use kanban_engine::kanban::{
    domain::Effort,
    ports::TimeLedgerStore,
    services::{ErrorKind, MoveTaskRequest},
};
use eyre::{OptionExt, WrapErr};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sessions_accumulate_into_actual_effort(engine: Engine) -> eyre::Result<()> {
    let board = engine.board("Support").await?;
    let todo = column_for(&board, "todo")?;
    let task = engine.task(&board, todo, "Triage queue").await?;
    let user = engine.manager.user_id();

    engine
        .store
        .start_timer(task.id(), user, Utc::now() - Duration::minutes(90))
        .await
        .wrap_err("seed a running session")?;
    let stopped = engine
        .ledger
        .stop(&engine.manager, task.id())
        .await
        .wrap_err("stop the session")?;
    eyre::ensure!(
        stopped.task.actual().minutes() == 90,
        "expected 90 minutes, got {}",
        stopped.task.actual().minutes()
    );

    engine
        .ledger
        .start(&engine.manager, task.id())
        .await
        .wrap_err("start a second session")?;
    engine
        .ledger
        .stop(&engine.manager, task.id())
        .await
        .wrap_err("stop the second session")?;

    let sessions = engine
        .ledger
        .list_sessions(&engine.manager, task.id())
        .await?;
    eyre::ensure!(sessions.len() == 2);
    eyre::ensure!(sessions.iter().all(|session| !session.is_active()));
    eyre::ensure!(
        engine
            .ledger
            .active_timer(&engine.manager, task.id())
            .await?
            .is_none()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivated_boards_only_allow_closing_sessions(engine: Engine) -> eyre::Result<()> {
    let board = engine.board("Support").await?;
    let todo = column_for(&board, "todo")?;
    let task = engine.task(&board, todo, "Triage queue").await?;
    engine
        .ledger
        .start(&engine.manager, task.id())
        .await
        .wrap_err("start before deactivation")?;

    engine
        .boards
        .set_board_active(&engine.manager, board.board.id(), false)
        .await
        .wrap_err("deactivate board")?;

    let moved = engine
        .tasks
        .move_task(&engine.manager, MoveTaskRequest::to_position(task.id(), 0))
        .await;
    eyre::ensure!(
        moved.as_ref().err().map(|err| err.kind()) == Some(ErrorKind::Conflict),
        "moves on inactive boards must conflict: {moved:?}"
    );

    engine
        .ledger
        .stop(&engine.manager, task.id())
        .await
        .wrap_err("running sessions can still be stopped")?;
    let restarted = engine.ledger.start(&engine.manager, task.id()).await;
    eyre::ensure!(
        restarted.as_ref().err().map(|err| err.kind()) == Some(ErrorKind::Conflict),
        "new sessions on inactive boards must conflict: {restarted:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn adjustments_overwrite_tracked_effort(engine: Engine) -> eyre::Result<()> {
    let board = engine.board("Support").await?;
    let todo = column_for(&board, "todo")?;
    let task = engine.task(&board, todo, "Write postmortem").await?;

    let adjusted = engine
        .ledger
        .adjust(&engine.manager, task.id(), Effort::from_minutes(150))
        .await
        .wrap_err("adjust effort")?;
    eyre::ensure!(adjusted.actual() == Effort::from_minutes(150));

    let events = engine.notifier.take();
    let last = events.last().ok_or_eyre("adjustment should emit an event")?;
    eyre::ensure!(last.name() == "effort_adjusted", "unexpected event {last:?}");
    Ok(())
}
