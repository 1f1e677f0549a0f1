//! Task placement, status synchronization, and history service.

use super::{KanbanContext, KanbanServiceError, KanbanServiceResult};
use crate::kanban::{
    domain::{
        Actor, BoardId, ColumnId, HistoryOrder, HistorySource, SlotRequest, Task, TaskChanges,
        TaskDraft, TaskHistoryEntry, TaskId, TaskStatus, TaskTransition,
    },
    ports::{
        BoardEvent, ChangeStatusCommand, KanbanStore, MoveTaskCommand, NewTaskCommand, Permission,
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    board_id: BoardId,
    column_id: Option<ColumnId>,
    draft: TaskDraft,
}

impl CreateTaskRequest {
    /// Creates a request for a task on `board_id` with the given editable
    /// attributes. The task lands in the board's first column unless
    /// [`Self::in_column`] is used.
    #[must_use]
    pub const fn new(board_id: BoardId, draft: TaskDraft) -> Self {
        Self {
            board_id,
            column_id: None,
            draft,
        }
    }

    /// Appends the task to `column_id` instead of the first column.
    #[must_use]
    pub const fn in_column(mut self, column_id: ColumnId) -> Self {
        self.column_id = Some(column_id);
        self
    }
}

/// Request payload for moving a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTaskRequest {
    task_id: TaskId,
    column_id: Option<ColumnId>,
    slot: SlotRequest,
    source: HistorySource,
}

impl MoveTaskRequest {
    /// Moves the task to `position`; positions past the end append.
    #[must_use]
    pub const fn to_position(task_id: TaskId, position: u32) -> Self {
        Self {
            task_id,
            column_id: None,
            slot: SlotRequest::At(position),
            source: HistorySource::Manual,
        }
    }

    /// Moves the task to the end of its target column.
    #[must_use]
    pub const fn to_end(task_id: TaskId) -> Self {
        Self {
            task_id,
            column_id: None,
            slot: SlotRequest::Append,
            source: HistorySource::Manual,
        }
    }

    /// Targets `column_id` instead of the task's current column.
    #[must_use]
    pub const fn into_column(mut self, column_id: ColumnId) -> Self {
        self.column_id = Some(column_id);
        self
    }

    /// Marks the history entry with `source`.
    #[must_use]
    pub const fn with_source(mut self, source: HistorySource) -> Self {
        self.source = source;
        self
    }
}

/// Request payload for a direct status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetStatusRequest {
    task_id: TaskId,
    status: String,
    source: HistorySource,
}

impl SetStatusRequest {
    /// Requests that `task_id` enter `status`.
    #[must_use]
    pub fn new(task_id: TaskId, status: impl Into<String>) -> Self {
        Self {
            task_id,
            status: status.into(),
            source: HistorySource::Manual,
        }
    }

    /// Marks the history entry with `source`.
    #[must_use]
    pub fn with_source(mut self, source: HistorySource) -> Self {
        self.source = source;
        self
    }
}

/// Creates, edits, moves, and deletes tasks.
#[derive(Clone)]
pub struct TaskService<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    context: KanbanContext<S, C>,
}

impl<S, C> TaskService<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(context: KanbanContext<S, C>) -> Self {
        Self { context }
    }

    /// Appends a new task to a column and allocates its code.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error without [`Permission::CreateTask`] or board
    /// membership, a validation error for a blank title or a foreign column,
    /// or a store error.
    pub async fn create_task(
        &self,
        actor: &Actor,
        request: CreateTaskRequest,
    ) -> KanbanServiceResult<Task> {
        self.context.authorize(actor, Permission::CreateTask)?;
        self.context.load_board(request.board_id).await?;
        self.context.require_member(request.board_id, actor).await?;
        let command = NewTaskCommand {
            board_id: request.board_id,
            column_id: request.column_id,
            draft: request.draft,
            code_prefix: self.context.config.task_code_prefix.clone(),
            created_by: actor.user_id(),
            now: self.context.clock.utc(),
        };
        let task = self.context.store.create_task(&command).await?;
        tracing::info!(
            board_id = %task.board_id(),
            task_id = %task.id(),
            code = %task.code(),
            column_id = %task.column_id(),
            position = task.position(),
            "task created"
        );
        self.context
            .record_history(&TaskHistoryEntry::created(&task, HistorySource::Manual))
            .await;
        self.context.notify(&BoardEvent::TaskCreated {
            board_id: task.board_id(),
            task_id: task.id(),
            actor: actor.user_id(),
        });
        Ok(task)
    }

    /// Returns a task.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown task or a forbidden error
    /// for non-members.
    pub async fn get_task(&self, actor: &Actor, task_id: TaskId) -> KanbanServiceResult<Task> {
        self.context.load_member_task(task_id, actor).await
    }

    /// Edits title, description, priority, assignee, due date, or estimate.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error without [`Permission::EditTask`], or a
    /// validation error for a blank title.
    pub async fn update_task(
        &self,
        actor: &Actor,
        task_id: TaskId,
        changes: TaskChanges,
    ) -> KanbanServiceResult<Task> {
        self.context.authorize(actor, Permission::EditTask)?;
        let current = self.context.load_member_task(task_id, actor).await?;
        if changes.is_empty() {
            return Ok(current);
        }
        let task = self
            .context
            .store
            .update_task(task_id, &changes, actor.user_id(), self.context.clock.utc())
            .await?;
        tracing::info!(board_id = %task.board_id(), %task_id, "task updated");
        self.task_updated(actor, &task);
        Ok(task)
    }

    /// Moves a task within its column or into another column of the same
    /// board, shifting siblings so both columns stay densely ranked.
    ///
    /// A move to the task's own slot is accepted and still recorded.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown tasks or columns, a validation
    /// error for a column on another board, or a conflict for locked tasks.
    pub async fn move_task(
        &self,
        actor: &Actor,
        request: MoveTaskRequest,
    ) -> KanbanServiceResult<Task> {
        self.context.authorize(actor, Permission::MoveTask)?;
        self.context.load_member_task(request.task_id, actor).await?;
        let now = self.context.clock.utc();
        let command = MoveTaskCommand {
            task_id: request.task_id,
            column_id: request.column_id,
            slot: request.slot,
            actor: actor.user_id(),
            now,
        };
        let transition = self.context.store.move_task(&command).await?;
        self.finish_transition(actor, &transition, request.source, now)
            .await;
        Ok(transition.task)
    }

    /// Sets a task's status and re-columns it into the column bound to the
    /// new status, appending at the end. Without a bound column only the
    /// status changes.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error when the transition policy denies the
    /// change, a validation error for a malformed status, or a conflict for
    /// locked tasks.
    pub async fn set_status(
        &self,
        actor: &Actor,
        request: SetStatusRequest,
    ) -> KanbanServiceResult<Task> {
        self.context.authorize(actor, Permission::EditTask)?;
        let status = TaskStatus::new(request.status)?;
        let current = self.context.load_member_task(request.task_id, actor).await?;
        if !self
            .context
            .policy()
            .can_transition_status(current.status(), &status, actor.role())
        {
            tracing::warn!(
                task_id = %current.id(),
                from = %current.status(),
                to = %status,
                role = %actor.role(),
                "status transition denied"
            );
            return Err(KanbanServiceError::TransitionDenied {
                from: current.status().clone(),
                to: status,
            });
        }
        if current.status() == &status {
            return Ok(current);
        }
        let now = self.context.clock.utc();
        let command = ChangeStatusCommand {
            task_id: request.task_id,
            status,
            actor: actor.user_id(),
            now,
        };
        let transition = self.context.store.change_status(&command).await?;
        self.finish_transition(actor, &transition, request.source, now)
            .await;
        Ok(transition.task)
    }

    /// Locks or unlocks a task against moves and status changes.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error without [`Permission::LockTask`], or a
    /// store error.
    pub async fn set_locked(
        &self,
        actor: &Actor,
        task_id: TaskId,
        locked: bool,
    ) -> KanbanServiceResult<Task> {
        self.context.authorize(actor, Permission::LockTask)?;
        let current = self.context.load_member_task(task_id, actor).await?;
        if current.is_locked() == locked {
            return Ok(current);
        }
        let task = self
            .context
            .store
            .set_task_locked(task_id, locked, actor.user_id(), self.context.clock.utc())
            .await?;
        tracing::info!(board_id = %task.board_id(), %task_id, locked, "task lock changed");
        self.task_updated(actor, &task);
        Ok(task)
    }

    /// Deletes a task with its history and timer sessions, closing the gap
    /// in its column.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error without [`Permission::DeleteTask`], or a
    /// store error.
    pub async fn delete_task(&self, actor: &Actor, task_id: TaskId) -> KanbanServiceResult<Task> {
        self.context.authorize(actor, Permission::DeleteTask)?;
        self.context.load_member_task(task_id, actor).await?;
        let task = self.context.store.delete_task(task_id).await?;
        tracing::info!(
            board_id = %task.board_id(),
            %task_id,
            column_id = %task.column_id(),
            "task deleted"
        );
        self.context.notify(&BoardEvent::TaskDeleted {
            board_id: task.board_id(),
            task_id,
            actor: actor.user_id(),
        });
        Ok(task)
    }

    /// Lists a task's history entries by time.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-members, or a store error.
    pub async fn list_history(
        &self,
        actor: &Actor,
        task_id: TaskId,
        order: HistoryOrder,
    ) -> KanbanServiceResult<Vec<TaskHistoryEntry>> {
        self.context.load_member_task(task_id, actor).await?;
        Ok(self.context.store.list_history(task_id, order).await?)
    }

    async fn finish_transition(
        &self,
        actor: &Actor,
        transition: &TaskTransition,
        source: HistorySource,
        now: DateTime<Utc>,
    ) {
        let task = &transition.task;
        tracing::info!(
            board_id = %task.board_id(),
            task_id = %task.id(),
            from_column = %transition.before.column_id,
            to_column = %task.column_id(),
            position = task.position(),
            status = %task.status(),
            "task placed"
        );
        self.context
            .record_history(&TaskHistoryEntry::transition(
                transition,
                source,
                actor.user_id(),
                now,
            ))
            .await;
        let status_only = !transition.changed_column()
            && transition.before.position == task.position()
            && &transition.before.status != task.status();
        if !status_only {
            self.context.notify(&BoardEvent::TaskMoved {
                board_id: task.board_id(),
                task_id: task.id(),
                from_column: transition.before.column_id,
                to_column: task.column_id(),
                position: task.position(),
                status: task.status().clone(),
                actor: actor.user_id(),
            });
        } else {
            self.task_updated(actor, task);
        }
    }

    fn task_updated(&self, actor: &Actor, task: &Task) {
        self.context.notify(&BoardEvent::TaskUpdated {
            board_id: task.board_id(),
            task_id: task.id(),
            actor: actor.user_id(),
        });
    }
}
