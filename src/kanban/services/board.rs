//! Board lifecycle and membership service.

use super::{KanbanContext, KanbanServiceResult};
use crate::kanban::{
    domain::{
        Actor, Board, BoardId, BoardMember, BoardSnapshot, Column, MemberRole, ProjectId, UserId,
    },
    ports::{BoardEvent, KanbanStore, Permission},
};
use mockable::Clock;

/// Request payload for creating a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBoardRequest {
    name: String,
    project_id: Option<ProjectId>,
}

impl CreateBoardRequest {
    /// Creates a request for a board named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_id: None,
        }
    }

    /// Associates the board with a project.
    #[must_use]
    pub const fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }
}

/// Creates boards, seeds their columns, and manages membership.
#[derive(Clone)]
pub struct BoardService<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    context: KanbanContext<S, C>,
}

impl<S, C> BoardService<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    /// Creates a new board service.
    #[must_use]
    pub const fn new(context: KanbanContext<S, C>) -> Self {
        Self { context }
    }

    /// Creates a board with the configured default columns and enrolls the
    /// creator as its admin, all in one store transaction.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error without [`Permission::CreateBoard`], a
    /// validation error for a blank name, or a store error.
    pub async fn create_board(
        &self,
        actor: &Actor,
        request: CreateBoardRequest,
    ) -> KanbanServiceResult<BoardSnapshot> {
        self.context.authorize(actor, Permission::CreateBoard)?;
        let board = Board::new(
            &request.name,
            request.project_id,
            actor.user_id(),
            &*self.context.clock,
        )?;
        let now = board.created_at();
        let mut columns = Vec::with_capacity(self.context.config.default_columns.len());
        for (index, template) in self.context.config.default_columns.iter().enumerate() {
            let position = u32::try_from(index).unwrap_or(u32::MAX);
            columns.push(Column::new(board.id(), template, position, now)?);
        }
        let owner = BoardMember::new(board.id(), actor.user_id(), MemberRole::Admin, now);

        self.context
            .store
            .create_board(&board, &columns, &owner)
            .await?;
        tracing::info!(board_id = %board.id(), columns = columns.len(), "board created");
        self.context.notify(&BoardEvent::BoardCreated {
            board_id: board.id(),
            actor: actor.user_id(),
        });
        Ok(BoardSnapshot::assemble(board, vec![owner], columns, Vec::new()))
    }

    /// Returns the board with its columns and tasks in position order.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown board, a forbidden error for
    /// non-members, or a store error.
    pub async fn get_board(
        &self,
        actor: &Actor,
        board_id: BoardId,
    ) -> KanbanServiceResult<BoardSnapshot> {
        let board = self.context.load_board(board_id).await?;
        self.context.require_member(board_id, actor).await?;
        let store = &self.context.store;
        let members = store.list_members(board_id).await?;
        let columns = store.list_columns(board_id).await?;
        let tasks = store.list_board_tasks(board_id).await?;
        Ok(BoardSnapshot::assemble(board, members, columns, tasks))
    }

    /// Lists the boards the actor belongs to.
    ///
    /// # Errors
    ///
    /// Returns a store error when the lookup fails.
    pub async fn list_boards(&self, actor: &Actor) -> KanbanServiceResult<Vec<Board>> {
        Ok(self
            .context
            .store
            .list_boards_for_member(actor.user_id())
            .await?)
    }

    /// Renames a board.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error unless the actor administers the board, a
    /// validation error for a blank name, or a store error.
    pub async fn rename_board(
        &self,
        actor: &Actor,
        board_id: BoardId,
        name: &str,
    ) -> KanbanServiceResult<Board> {
        let mut board = self.authorize_management(actor, board_id).await?;
        board.rename(name, &*self.context.clock)?;
        self.save_board(actor, &board).await?;
        Ok(board)
    }

    /// Activates or deactivates a board. Deactivated boards keep their data
    /// but reject changes to columns, tasks, and timers.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error unless the actor administers the board, or
    /// a store error.
    pub async fn set_board_active(
        &self,
        actor: &Actor,
        board_id: BoardId,
        active: bool,
    ) -> KanbanServiceResult<Board> {
        let mut board = self.authorize_management(actor, board_id).await?;
        if board.is_active() == active {
            return Ok(board);
        }
        board.set_active(active, &*self.context.clock);
        self.save_board(actor, &board).await?;
        Ok(board)
    }

    /// Lists the members of a board.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-members, or a store error.
    pub async fn list_members(
        &self,
        actor: &Actor,
        board_id: BoardId,
    ) -> KanbanServiceResult<Vec<BoardMember>> {
        self.context.load_board(board_id).await?;
        self.context.require_member(board_id, actor).await?;
        Ok(self.context.store.list_members(board_id).await?)
    }

    /// Adds a member, or changes an existing member's role.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error unless the actor administers the board, or
    /// a conflict when the change would leave the board without an admin.
    pub async fn set_member(
        &self,
        actor: &Actor,
        board_id: BoardId,
        user_id: UserId,
        role: MemberRole,
    ) -> KanbanServiceResult<BoardMember> {
        self.authorize_management(actor, board_id).await?;
        let member = match self.context.store.find_member(board_id, user_id).await? {
            Some(mut existing) => {
                existing.set_role(role);
                existing
            }
            None => BoardMember::new(board_id, user_id, role, self.context.clock.utc()),
        };
        self.context.store.save_member(&member).await?;
        tracing::info!(%board_id, %user_id, role = %role, "board member saved");
        self.context.notify(&BoardEvent::BoardUpdated {
            board_id,
            actor: actor.user_id(),
        });
        Ok(member)
    }

    /// Removes a member from a board.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error unless the actor administers the board, a
    /// not-found error for non-members, or a conflict for the last admin.
    pub async fn remove_member(
        &self,
        actor: &Actor,
        board_id: BoardId,
        user_id: UserId,
    ) -> KanbanServiceResult<()> {
        self.authorize_management(actor, board_id).await?;
        self.context.store.remove_member(board_id, user_id).await?;
        tracing::info!(%board_id, %user_id, "board member removed");
        self.context.notify(&BoardEvent::BoardUpdated {
            board_id,
            actor: actor.user_id(),
        });
        Ok(())
    }

    async fn authorize_management(
        &self,
        actor: &Actor,
        board_id: BoardId,
    ) -> KanbanServiceResult<Board> {
        self.context.authorize(actor, Permission::ManageBoard)?;
        let board = self.context.load_board(board_id).await?;
        self.context.require_board_admin(board_id, actor).await?;
        Ok(board)
    }

    async fn save_board(&self, actor: &Actor, board: &Board) -> KanbanServiceResult<()> {
        self.context.store.update_board(board).await?;
        tracing::info!(
            board_id = %board.id(),
            active = board.is_active(),
            "board updated"
        );
        self.context.notify(&BoardEvent::BoardUpdated {
            board_id: board.id(),
            actor: actor.user_id(),
        });
        Ok(())
    }
}
