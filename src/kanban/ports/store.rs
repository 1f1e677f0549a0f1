//! Store ports for boards, columns, tasks, history, and the time ledger.
//!
//! Every mutating method is a single atomic unit: implementations either
//! apply all of its row changes or none of them, and serialize concurrent
//! writers touching the same column or (task, user) timer.

use super::KanbanStoreResult;
use crate::kanban::domain::{
    Board, BoardId, BoardMember, Column, ColumnChanges, ColumnId, ColumnTemplate, Effort,
    HistoryOrder, SlotRequest, Task, TaskChanges, TaskDraft, TaskHistoryEntry, TaskId, TaskStatus,
    TaskTransition, TimeLogEntry, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Board and membership persistence.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Stores a new board together with its seeded columns and its first
    /// admin member.
    ///
    /// # Errors
    ///
    /// Returns [`super::KanbanStoreError::Persistence`] when the rows cannot
    /// be written.
    async fn create_board(
        &self,
        board: &Board,
        columns: &[Column],
        owner: &BoardMember,
    ) -> KanbanStoreResult<()>;

    /// Finds a board by identifier.
    async fn find_board(&self, id: BoardId) -> KanbanStoreResult<Option<Board>>;

    /// Persists name and active flag changes.
    ///
    /// # Errors
    ///
    /// Returns [`super::KanbanStoreError::BoardNotFound`] when the board
    /// does not exist.
    async fn update_board(&self, board: &Board) -> KanbanStoreResult<()>;

    /// Lists boards the user is a member of.
    async fn list_boards_for_member(&self, user_id: UserId) -> KanbanStoreResult<Vec<Board>>;

    /// Finds a user's membership on a board.
    async fn find_member(
        &self,
        board_id: BoardId,
        user_id: UserId,
    ) -> KanbanStoreResult<Option<BoardMember>>;

    /// Lists the members of a board.
    async fn list_members(&self, board_id: BoardId) -> KanbanStoreResult<Vec<BoardMember>>;

    /// Adds a member or changes an existing member's role.
    ///
    /// # Errors
    ///
    /// Returns [`super::KanbanStoreError::LastAdmin`] when the change would
    /// demote the board's only admin.
    async fn save_member(&self, member: &BoardMember) -> KanbanStoreResult<()>;

    /// Removes a member.
    ///
    /// # Errors
    ///
    /// Returns [`super::KanbanStoreError::MemberNotFound`] or
    /// [`super::KanbanStoreError::LastAdmin`].
    async fn remove_member(&self, board_id: BoardId, user_id: UserId) -> KanbanStoreResult<()>;
}

/// Column sequence persistence.
#[async_trait]
pub trait ColumnStore: Send + Sync {
    /// Finds a column by identifier.
    async fn find_column(&self, id: ColumnId) -> KanbanStoreResult<Option<Column>>;

    /// Lists a board's columns ordered by position.
    async fn list_columns(&self, board_id: BoardId) -> KanbanStoreResult<Vec<Column>>;

    /// Appends a column after the board's last column.
    ///
    /// # Errors
    ///
    /// Returns [`super::KanbanStoreError::DuplicateColumnStatus`] when the
    /// status is already bound on the board.
    async fn append_column(
        &self,
        board_id: BoardId,
        template: &ColumnTemplate,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Column>;

    /// Renames, recolors, or repositions a column. A reposition renumbers
    /// the board's columns densely around the new slot.
    async fn update_column(
        &self,
        id: ColumnId,
        changes: &ColumnChanges,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Column>;

    /// Assigns `position = index` to each listed column.
    ///
    /// # Errors
    ///
    /// Returns [`super::KanbanStoreError::ColumnOrderMismatch`] unless the
    /// list names every column of the board exactly once.
    async fn reorder_columns(
        &self,
        board_id: BoardId,
        ordered: &[ColumnId],
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Vec<Column>>;

    /// Deletes an empty column without renumbering its siblings.
    ///
    /// # Errors
    ///
    /// Returns [`super::KanbanStoreError::ColumnHasTasks`] when any task
    /// still references the column.
    async fn delete_column(&self, id: ColumnId) -> KanbanStoreResult<Column>;
}

/// Input for appending a task to a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskCommand {
    /// Board receiving the task.
    pub board_id: BoardId,
    /// Column receiving the task; the board's first column when absent.
    pub column_id: Option<ColumnId>,
    /// Editable attributes.
    pub draft: TaskDraft,
    /// Prefix of the generated task code.
    pub code_prefix: String,
    /// Creating user.
    pub created_by: UserId,
    /// Creation time.
    pub now: DateTime<Utc>,
}

/// Input for moving a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTaskCommand {
    /// Task to move.
    pub task_id: TaskId,
    /// Destination column; the task's current column when absent.
    pub column_id: Option<ColumnId>,
    /// Destination slot.
    pub slot: SlotRequest,
    /// Acting user.
    pub actor: UserId,
    /// Move time.
    pub now: DateTime<Utc>,
}

/// Input for a direct status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeStatusCommand {
    /// Task to update.
    pub task_id: TaskId,
    /// New logical status.
    pub status: TaskStatus,
    /// Acting user.
    pub actor: UserId,
    /// Change time.
    pub now: DateTime<Utc>,
}

/// Task and position persistence, including the move engine's atomic
/// read-shift-write sequences.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Appends a new task to a column, allocating its code from the board's
    /// task sequence.
    ///
    /// # Errors
    ///
    /// Returns [`super::KanbanStoreError::BoardInactive`] for deactivated
    /// boards and not-found errors for absent boards or columns.
    async fn create_task(&self, command: &NewTaskCommand) -> KanbanStoreResult<Task>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> KanbanStoreResult<Option<Task>>;

    /// Lists every task on a board.
    async fn list_board_tasks(&self, board_id: BoardId) -> KanbanStoreResult<Vec<Task>>;

    /// Lists a column's tasks ordered by position.
    async fn list_column_tasks(&self, column_id: ColumnId) -> KanbanStoreResult<Vec<Task>>;

    /// Applies editable attribute changes without touching placement.
    async fn update_task(
        &self,
        id: TaskId,
        changes: &TaskChanges,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Task>;

    /// Sets or clears the task's move lock.
    async fn set_task_locked(
        &self,
        id: TaskId,
        locked: bool,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Task>;

    /// Moves a task, shifting siblings in the source and target columns.
    ///
    /// # Errors
    ///
    /// Returns not-found errors for absent tasks or columns,
    /// [`super::KanbanStoreError::ColumnOnOtherBoard`] for foreign columns,
    /// and [`crate::kanban::domain::KanbanDomainError::TaskLocked`] for
    /// locked tasks.
    async fn move_task(&self, command: &MoveTaskCommand) -> KanbanStoreResult<TaskTransition>;

    /// Changes a task's status, appending it to the column bound to the new
    /// status when one exists.
    async fn change_status(
        &self,
        command: &ChangeStatusCommand,
    ) -> KanbanStoreResult<TaskTransition>;

    /// Deletes a task with its history and timer sessions and closes the
    /// gap it leaves in its column.
    async fn delete_task(&self, id: TaskId) -> KanbanStoreResult<Task>;

    /// Overwrites the task's tracked effort.
    async fn override_effort(
        &self,
        id: TaskId,
        effort: Effort,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Task>;
}

/// Append-only history persistence.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends an entry.
    async fn append_history(&self, entry: &TaskHistoryEntry) -> KanbanStoreResult<()>;

    /// Lists a task's entries by time.
    async fn list_history(
        &self,
        task_id: TaskId,
        order: HistoryOrder,
    ) -> KanbanStoreResult<Vec<TaskHistoryEntry>>;
}

/// Timer session persistence.
#[async_trait]
pub trait TimeLedgerStore: Send + Sync {
    /// Opens a session for the pair.
    ///
    /// # Errors
    ///
    /// Returns [`super::KanbanStoreError::ActiveTimerExists`] when the pair
    /// already has an active session.
    async fn start_timer(
        &self,
        task_id: TaskId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<TimeLogEntry>;

    /// Closes the pair's active session and adds its duration to the task.
    ///
    /// # Errors
    ///
    /// Returns [`super::KanbanStoreError::NoActiveTimer`] when no session is
    /// active.
    async fn stop_timer(
        &self,
        task_id: TaskId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<(TimeLogEntry, Task)>;

    /// Finds the pair's active session.
    async fn find_active_timer(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> KanbanStoreResult<Option<TimeLogEntry>>;

    /// Lists every session recorded for a task, oldest first.
    async fn list_sessions(&self, task_id: TaskId) -> KanbanStoreResult<Vec<TimeLogEntry>>;
}

/// Convenience bound for a store implementing every Kanban port.
pub trait KanbanStore:
    BoardStore + ColumnStore + TaskStore + HistoryStore + TimeLedgerStore
{
}

impl<T> KanbanStore for T where
    T: BoardStore + ColumnStore + TaskStore + HistoryStore + TimeLedgerStore
{
}
