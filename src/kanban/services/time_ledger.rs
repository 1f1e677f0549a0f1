//! Per-task time tracking service.

use super::{KanbanContext, KanbanServiceResult};
use crate::kanban::{
    domain::{Actor, Effort, Task, TaskId, TimeLogEntry},
    ports::{BoardEvent, KanbanStore, Permission},
};
use mockable::Clock;

/// A closed timer session together with the task it was booked on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoppedTimer {
    /// The closed session.
    pub session: TimeLogEntry,
    /// The task with the session's duration added to its tracked effort.
    pub task: Task,
}

/// Starts and stops timers and adjusts tracked effort.
#[derive(Clone)]
pub struct TimeLedgerService<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    context: KanbanContext<S, C>,
}

impl<S, C> TimeLedgerService<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    /// Creates a new time ledger service.
    #[must_use]
    pub const fn new(context: KanbanContext<S, C>) -> Self {
        Self { context }
    }

    /// Starts the actor's timer on a task.
    ///
    /// # Errors
    ///
    /// Returns a conflict when the actor already has an active timer on the
    /// task, or a forbidden error for non-members.
    pub async fn start(&self, actor: &Actor, task_id: TaskId) -> KanbanServiceResult<TimeLogEntry> {
        self.context.load_member_task(task_id, actor).await?;
        let session = self
            .context
            .store
            .start_timer(task_id, actor.user_id(), self.context.clock.utc())
            .await?;
        tracing::info!(
            %task_id,
            user_id = %actor.user_id(),
            session_id = %session.id(),
            "timer started"
        );
        self.context.notify(&BoardEvent::TimerStarted {
            task_id,
            user_id: actor.user_id(),
        });
        Ok(session)
    }

    /// Stops the actor's active timer and books its rounded duration onto
    /// the task.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no timer is active.
    pub async fn stop(&self, actor: &Actor, task_id: TaskId) -> KanbanServiceResult<StoppedTimer> {
        self.context.load_member_task(task_id, actor).await?;
        let (session, task) = self
            .context
            .store
            .stop_timer(task_id, actor.user_id(), self.context.clock.utc())
            .await?;
        let duration = session.duration().unwrap_or(Effort::ZERO);
        tracing::info!(
            %task_id,
            user_id = %actor.user_id(),
            minutes = duration.minutes(),
            actual_minutes = task.actual().minutes(),
            "timer stopped"
        );
        self.context.notify(&BoardEvent::TimerStopped {
            task_id,
            user_id: actor.user_id(),
            duration,
        });
        Ok(StoppedTimer { session, task })
    }

    /// Overwrites a task's tracked effort outside the ledger.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error without [`Permission::AdjustEffort`].
    pub async fn adjust(
        &self,
        actor: &Actor,
        task_id: TaskId,
        actual: Effort,
    ) -> KanbanServiceResult<Task> {
        self.context.authorize(actor, Permission::AdjustEffort)?;
        let current = self.context.load_member_task(task_id, actor).await?;
        let task = self
            .context
            .store
            .override_effort(task_id, actual, actor.user_id(), self.context.clock.utc())
            .await?;
        tracing::warn!(
            %task_id,
            user_id = %actor.user_id(),
            previous_minutes = current.actual().minutes(),
            minutes = actual.minutes(),
            "tracked effort adjusted"
        );
        self.context.notify(&BoardEvent::EffortAdjusted {
            task_id,
            previous: current.actual(),
            current: task.actual(),
            actor: actor.user_id(),
        });
        Ok(task)
    }

    /// Returns the actor's active timer on a task.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-members, or a store error.
    pub async fn active_timer(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> KanbanServiceResult<Option<TimeLogEntry>> {
        self.context.load_member_task(task_id, actor).await?;
        Ok(self
            .context
            .store
            .find_active_timer(task_id, actor.user_id())
            .await?)
    }

    /// Lists every session on a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-members, or a store error.
    pub async fn list_sessions(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> KanbanServiceResult<Vec<TimeLogEntry>> {
        self.context.load_member_task(task_id, actor).await?;
        Ok(self.context.store.list_sessions(task_id).await?)
    }
}
