//! Then steps for Kanban board BDD scenarios.

use super::world::{KanbanWorld, run_async, titles};
use eyre::WrapErr;
use rstest_bdd_macros::then;

#[then(r#"column "{status}" holds "{list}""#)]
fn column_holds(world: &KanbanWorld, status: String, list: String) -> Result<(), eyre::Report> {
    if let Some(err) = &world.last_error {
        return Err(eyre::eyre!("last operation failed unexpectedly: {err}"));
    }
    let board_id = world.board()?.board.id();
    let column_id = world.column(&status)?;
    let snapshot = run_async(world.boards.get_board(&world.actor, board_id))
        .wrap_err("read board")?;
    let column = snapshot
        .column(column_id)
        .ok_or_else(|| eyre::eyre!("column {status} missing from board view"))?;

    let actual: Vec<String> = column
        .tasks
        .iter()
        .map(|task| task.title().to_owned())
        .collect();
    let expected = titles(&list);
    if actual != expected {
        return Err(eyre::eyre!("column {status}: expected {expected:?}, found {actual:?}"));
    }
    for (index, task) in column.tasks.iter().enumerate() {
        if usize::try_from(task.position()).ok() != Some(index) {
            return Err(eyre::eyre!(
                "task {} sits at {} instead of {index}",
                task.title(),
                task.position()
            ));
        }
    }
    Ok(())
}

#[then(r#"task "{title}" has status "{status}""#)]
fn task_has_status(world: &KanbanWorld, title: String, status: String) -> Result<(), eyre::Report> {
    let task = run_async(world.tasks.get_task(&world.actor, world.task(&title)?))
        .wrap_err("read task")?;
    if task.status().as_str() != status {
        return Err(eyre::eyre!("expected status {status}, found {}", task.status()));
    }
    Ok(())
}

#[then(r#"task "{title}" has {minutes:u32} minutes of tracked effort"#)]
fn task_has_effort(world: &KanbanWorld, title: String, minutes: u32) -> Result<(), eyre::Report> {
    let task = run_async(world.tasks.get_task(&world.actor, world.task(&title)?))
        .wrap_err("read task")?;
    if task.actual().minutes() != minutes {
        return Err(eyre::eyre!(
            "expected {minutes} tracked minutes, found {}",
            task.actual().minutes()
        ));
    }
    Ok(())
}

#[then(r#"the last operation fails with a "{kind}" error"#)]
fn last_operation_fails(world: &KanbanWorld, kind: String) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the last operation to fail"))?;
    if err.kind().as_str() != kind {
        return Err(eyre::eyre!("expected a {kind} error, got {err:?}"));
    }
    Ok(())
}
