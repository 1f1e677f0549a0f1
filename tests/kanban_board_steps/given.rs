//! Given steps for Kanban board BDD scenarios.

use super::world::{KanbanWorld, run_async, titles};
use chrono::{Duration, Utc};
use eyre::WrapErr;
use kanban_engine::kanban::{
    domain::TaskDraft,
    ports::TimeLedgerStore,
    services::{CreateBoardRequest, CreateTaskRequest},
};
use rstest_bdd_macros::given;

#[given("an operations board")]
fn operations_board(world: &mut KanbanWorld) -> Result<(), eyre::Report> {
    let board = run_async(
        world
            .boards
            .create_board(&world.actor, CreateBoardRequest::new("Operations")),
    )
    .wrap_err("create board for scenario")?;
    world.board = Some(board);
    Ok(())
}

#[given(r#"tasks "{list}" in column "{status}""#)]
fn tasks_in_column(
    world: &mut KanbanWorld,
    list: String,
    status: String,
) -> Result<(), eyre::Report> {
    let board_id = world.board()?.board.id();
    let column_id = world.column(&status)?;
    for title in titles(&list) {
        let draft = TaskDraft {
            title: title.clone(),
            ..TaskDraft::default()
        };
        let task = run_async(world.tasks.create_task(
            &world.actor,
            CreateTaskRequest::new(board_id, draft).in_column(column_id),
        ))
        .wrap_err_with(|| format!("create task {title}"))?;
        world.task_ids.insert(title, task.id());
    }
    Ok(())
}

#[given(r#"a timer on task "{title}" started {minutes:i64} minutes ago"#)]
fn timer_started_earlier(
    world: &mut KanbanWorld,
    title: String,
    minutes: i64,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?;
    let started_at = Utc::now() - Duration::minutes(minutes);
    run_async(
        world
            .store
            .start_timer(task_id, world.actor.user_id(), started_at),
    )
    .wrap_err("seed running timer")?;
    Ok(())
}
