//! Dependencies shared by every Kanban service.

use super::{KanbanServiceError, KanbanServiceResult};
use crate::kanban::{
    config::KanbanConfig,
    domain::{
        Actor, ActorRole, Board, BoardId, BoardMember, Column, ColumnId, Task, TaskHistoryEntry,
        TaskId,
    },
    ports::{AccessPolicy, BoardEvent, BoardNotifier, KanbanStore, Permission},
};
use mockable::Clock;
use std::sync::Arc;

/// Store, clock, policy, notifier, and configuration wired into the
/// services.
pub struct KanbanContext<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    pub(super) store: Arc<S>,
    pub(super) clock: Arc<C>,
    policy: Arc<dyn AccessPolicy>,
    notifier: Arc<dyn BoardNotifier>,
    pub(super) config: Arc<KanbanConfig>,
}

impl<S, C> Clone for KanbanContext<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            policy: Arc::clone(&self.policy),
            notifier: Arc::clone(&self.notifier),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, C> KanbanContext<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    /// Creates a context with the default configuration.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        clock: Arc<C>,
        policy: Arc<dyn AccessPolicy>,
        notifier: Arc<dyn BoardNotifier>,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
            notifier,
            config: Arc::new(KanbanConfig::default()),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: KanbanConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Returns the configuration in use.
    #[must_use]
    pub fn config(&self) -> &KanbanConfig {
        &self.config
    }

    pub(super) fn authorize(
        &self,
        actor: &Actor,
        permission: Permission,
    ) -> KanbanServiceResult<()> {
        if self.policy.authorize(actor, permission) {
            return Ok(());
        }
        tracing::warn!(user_id = %actor.user_id(), %permission, "permission denied");
        Err(KanbanServiceError::PermissionDenied {
            user_id: actor.user_id(),
            permission,
        })
    }

    pub(super) fn policy(&self) -> &dyn AccessPolicy {
        self.policy.as_ref()
    }

    pub(super) fn notify(&self, event: &BoardEvent) {
        self.notifier.notify(event);
    }

    /// Platform admins act on every board; everyone else needs a membership.
    pub(super) async fn require_member(
        &self,
        board_id: BoardId,
        actor: &Actor,
    ) -> KanbanServiceResult<Option<BoardMember>> {
        let member = self.store.find_member(board_id, actor.user_id()).await?;
        if member.is_none() && actor.role() != ActorRole::Admin {
            tracing::warn!(%board_id, user_id = %actor.user_id(), "board access denied");
            return Err(KanbanServiceError::NotMember {
                board_id,
                user_id: actor.user_id(),
            });
        }
        Ok(member)
    }

    pub(super) async fn require_board_admin(
        &self,
        board_id: BoardId,
        actor: &Actor,
    ) -> KanbanServiceResult<()> {
        let member = self.require_member(board_id, actor).await?;
        let is_admin = actor.role() == ActorRole::Admin || member.is_some_and(|m| m.is_admin());
        if !is_admin {
            tracing::warn!(%board_id, user_id = %actor.user_id(), "board admin required");
            return Err(KanbanServiceError::NotBoardAdmin {
                board_id,
                user_id: actor.user_id(),
            });
        }
        Ok(())
    }

    pub(super) async fn load_board(&self, id: BoardId) -> KanbanServiceResult<Board> {
        self.store
            .find_board(id)
            .await?
            .ok_or(KanbanServiceError::BoardNotFound(id))
    }

    pub(super) async fn load_column(&self, id: ColumnId) -> KanbanServiceResult<Column> {
        self.store
            .find_column(id)
            .await?
            .ok_or(KanbanServiceError::ColumnNotFound(id))
    }

    pub(super) async fn load_task(&self, id: TaskId) -> KanbanServiceResult<Task> {
        self.store
            .find_task(id)
            .await?
            .ok_or(KanbanServiceError::TaskNotFound(id))
    }

    /// Loads a task the actor may act on.
    pub(super) async fn load_member_task(
        &self,
        id: TaskId,
        actor: &Actor,
    ) -> KanbanServiceResult<Task> {
        let task = self.load_task(id).await?;
        self.require_member(task.board_id(), actor).await?;
        Ok(task)
    }

    /// Appends a history entry. Failures are logged and never surface to the
    /// caller, whose mutation has already committed.
    pub(super) async fn record_history(&self, entry: &TaskHistoryEntry) {
        if let Err(err) = self.store.append_history(entry).await {
            tracing::error!(
                task_id = %entry.task_id(),
                history_id = %entry.id(),
                error = %err,
                "failed to record task history"
            );
        }
    }
}
