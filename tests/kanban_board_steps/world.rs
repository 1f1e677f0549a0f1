//! Shared world state for Kanban board BDD scenarios.

use std::{collections::HashMap, sync::Arc};

use kanban_engine::kanban::{
    adapters::{memory::InMemoryKanbanStore, notify::TracingNotifier, policy::RoleAccessPolicy},
    domain::{Actor, ActorRole, BoardSnapshot, ColumnId, TaskId, UserId},
    services::{
        BoardService, ColumnService, KanbanContext, KanbanServiceError, TaskService,
        TimeLedgerService,
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Scenario world for Kanban board behaviour tests.
pub struct KanbanWorld {
    pub store: Arc<InMemoryKanbanStore>,
    pub boards: BoardService<InMemoryKanbanStore, DefaultClock>,
    pub columns: ColumnService<InMemoryKanbanStore, DefaultClock>,
    pub tasks: TaskService<InMemoryKanbanStore, DefaultClock>,
    pub ledger: TimeLedgerService<InMemoryKanbanStore, DefaultClock>,
    pub actor: Actor,
    pub board: Option<BoardSnapshot>,
    pub task_ids: HashMap<String, TaskId>,
    pub last_error: Option<KanbanServiceError>,
}

impl KanbanWorld {
    /// Creates a world with an empty store and no board.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryKanbanStore::new());
        let context = KanbanContext::new(
            Arc::clone(&store),
            Arc::new(DefaultClock),
            Arc::new(RoleAccessPolicy::new()),
            Arc::new(TracingNotifier),
        );

        Self {
            store,
            boards: BoardService::new(context.clone()),
            columns: ColumnService::new(context.clone()),
            tasks: TaskService::new(context.clone()),
            ledger: TimeLedgerService::new(context),
            actor: Actor::new(UserId::new(), ActorRole::Manager),
            board: None,
            task_ids: HashMap::new(),
            last_error: None,
        }
    }

    /// Returns the scenario board.
    ///
    /// # Errors
    ///
    /// Returns an error when no board has been created yet.
    pub fn board(&self) -> eyre::Result<&BoardSnapshot> {
        self.board
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing board in scenario world"))
    }

    /// Finds the column bound to `status` on the scenario board.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no board or no such column.
    pub fn column(&self, status: &str) -> eyre::Result<ColumnId> {
        self.board()?
            .columns
            .iter()
            .find(|snapshot| snapshot.column.status().as_str() == status)
            .map(|snapshot| snapshot.column.id())
            .ok_or_else(|| eyre::eyre!("no column bound to {status}"))
    }

    /// Looks up a task created by the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when no task carries `title`.
    pub fn task(&self, title: &str) -> eyre::Result<TaskId> {
        self.task_ids
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task titled {title} in scenario world"))
    }

    /// Remembers the outcome of the latest action.
    pub fn record<T>(&mut self, result: Result<T, KanbanServiceError>) {
        self.last_error = result.err();
    }
}

impl Default for KanbanWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> KanbanWorld {
    KanbanWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Splits a comma separated title list.
#[must_use]
pub fn titles(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_owned)
        .collect()
}
