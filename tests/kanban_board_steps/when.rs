//! When steps for Kanban board BDD scenarios.

use super::world::{KanbanWorld, run_async};
use kanban_engine::kanban::services::{MoveTaskRequest, SetStatusRequest};
use rstest_bdd_macros::when;

#[when(r#"task "{title}" is moved to position {position:u32} in its column"#)]
fn task_moved_in_place(
    world: &mut KanbanWorld,
    title: String,
    position: u32,
) -> Result<(), eyre::Report> {
    let request = MoveTaskRequest::to_position(world.task(&title)?, position);
    let result = run_async(world.tasks.move_task(&world.actor, request));
    world.record(result);
    Ok(())
}

#[when(r#"task "{title}" is moved to position {position:u32} of column "{status}""#)]
fn task_moved_across(
    world: &mut KanbanWorld,
    title: String,
    position: u32,
    status: String,
) -> Result<(), eyre::Report> {
    let request = MoveTaskRequest::to_position(world.task(&title)?, position)
        .into_column(world.column(&status)?);
    let result = run_async(world.tasks.move_task(&world.actor, request));
    world.record(result);
    Ok(())
}

#[when(r#"the status of task "{title}" is set to "{status}""#)]
fn status_set(world: &mut KanbanWorld, title: String, status: String) -> Result<(), eyre::Report> {
    let request = SetStatusRequest::new(world.task(&title)?, status);
    let result = run_async(world.tasks.set_status(&world.actor, request));
    world.record(result);
    Ok(())
}

#[when(r#"a timer is started on task "{title}""#)]
fn timer_started(world: &mut KanbanWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?;
    let result = run_async(world.ledger.start(&world.actor, task_id));
    world.record(result);
    Ok(())
}

#[when(r#"the timer on task "{title}" is stopped"#)]
fn timer_stopped(world: &mut KanbanWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?;
    let result = run_async(world.ledger.stop(&world.actor, task_id));
    world.record(result);
    Ok(())
}

#[when(r#"column "{status}" is deleted"#)]
fn column_deleted(world: &mut KanbanWorld, status: String) -> Result<(), eyre::Report> {
    let column_id = world.column(&status)?;
    let result = run_async(world.columns.delete_column(&world.actor, column_id));
    world.record(result);
    Ok(())
}
