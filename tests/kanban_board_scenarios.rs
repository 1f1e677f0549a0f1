//! Behaviour tests for task placement, status sync, and the time ledger.

mod kanban_board_steps;

use kanban_board_steps::world::{KanbanWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/kanban_board.feature",
    name = "Reorder a task within its column"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_within_column(world: KanbanWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/kanban_board.feature",
    name = "Move a task into another column"
)]
#[tokio::test(flavor = "multi_thread")]
async fn move_across_columns(world: KanbanWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/kanban_board.feature",
    name = "Setting a status re-columns the task"
)]
#[tokio::test(flavor = "multi_thread")]
async fn status_recolumns_task(world: KanbanWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/kanban_board.feature",
    name = "Reject a second active timer"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_second_timer(world: KanbanWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/kanban_board.feature",
    name = "Stopping a timer books the elapsed effort"
)]
#[tokio::test(flavor = "multi_thread")]
async fn stopping_books_effort(world: KanbanWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/kanban_board.feature",
    name = "Reject deleting a column that still holds tasks"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_deleting_populated_column(world: KanbanWorld) {
    let _ = world;
}
