//! Shared helpers for in-memory Kanban integration tests.

use std::sync::Arc;

use eyre::{OptionExt, WrapErr};
use kanban_engine::kanban::{
    adapters::{memory::InMemoryKanbanStore, notify::RecordingNotifier, policy::RoleAccessPolicy},
    config::KanbanConfig,
    domain::{Actor, ActorRole, BoardSnapshot, ColumnId, Task, TaskDraft, UserId},
    ports::BoardNotifier,
    services::{
        BoardService, ColumnService, CreateBoardRequest, CreateTaskRequest, KanbanContext,
        TaskService, TimeLedgerService,
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Services wired to one shared in-memory store.
pub struct Engine {
    pub store: Arc<InMemoryKanbanStore>,
    pub notifier: RecordingNotifier,
    pub boards: BoardService<InMemoryKanbanStore, DefaultClock>,
    pub columns: ColumnService<InMemoryKanbanStore, DefaultClock>,
    pub tasks: TaskService<InMemoryKanbanStore, DefaultClock>,
    pub ledger: TimeLedgerService<InMemoryKanbanStore, DefaultClock>,
    pub manager: Actor,
}

impl Engine {
    /// Wires the services with the given configuration and policy.
    #[must_use]
    pub fn with(config: KanbanConfig, policy: RoleAccessPolicy) -> Self {
        let store = Arc::new(InMemoryKanbanStore::new());
        let notifier = RecordingNotifier::new();
        let sink: Arc<dyn BoardNotifier> = Arc::new(notifier.clone());
        let context = KanbanContext::new(
            Arc::clone(&store),
            Arc::new(DefaultClock),
            Arc::new(policy),
            sink,
        )
        .with_config(config);
        Self {
            store,
            notifier,
            boards: BoardService::new(context.clone()),
            columns: ColumnService::new(context.clone()),
            tasks: TaskService::new(context.clone()),
            ledger: TimeLedgerService::new(context),
            manager: Actor::new(UserId::new(), ActorRole::Manager),
        }
    }

    /// Creates a board owned by the manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be created.
    pub async fn board(&self, name: &str) -> eyre::Result<BoardSnapshot> {
        self.boards
            .create_board(&self.manager, CreateBoardRequest::new(name))
            .await
            .wrap_err("create board")
    }

    /// Appends a titled task to a column.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot be created.
    pub async fn task(
        &self,
        board: &BoardSnapshot,
        column_id: ColumnId,
        title: &str,
    ) -> eyre::Result<Task> {
        let draft = TaskDraft {
            title: title.to_owned(),
            ..TaskDraft::default()
        };
        self.tasks
            .create_task(
                &self.manager,
                CreateTaskRequest::new(board.board.id(), draft).in_column(column_id),
            )
            .await
            .wrap_err_with(|| format!("create task {title}"))
    }

    /// Returns the titles of a column's tasks in position order.
    ///
    /// # Errors
    ///
    /// Returns an error if the board or column cannot be read.
    pub async fn titles(
        &self,
        board: &BoardSnapshot,
        column_id: ColumnId,
    ) -> eyre::Result<Vec<String>> {
        let snapshot = self
            .boards
            .get_board(&self.manager, board.board.id())
            .await
            .wrap_err("read board")?;
        let column = snapshot
            .column(column_id)
            .ok_or_eyre("column missing from board snapshot")?;
        Ok(column
            .tasks
            .iter()
            .map(|task| task.title().to_owned())
            .collect())
    }
}

/// Finds the column bound to `status`.
///
/// # Errors
///
/// Returns an error when no column carries the status.
pub fn column_for(board: &BoardSnapshot, status: &str) -> eyre::Result<ColumnId> {
    board
        .columns
        .iter()
        .find(|snapshot| snapshot.column.status().as_str() == status)
        .map(|snapshot| snapshot.column.id())
        .ok_or_else(|| eyre::eyre!("no column bound to {status}"))
}

/// Provides services with the stock configuration and role policy.
#[fixture]
pub fn engine() -> Engine {
    Engine::with(KanbanConfig::default(), RoleAccessPolicy::new())
}
