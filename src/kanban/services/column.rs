//! Column sequence service.

use super::{KanbanContext, KanbanServiceResult};
use crate::kanban::{
    domain::{Actor, BoardId, Column, ColumnChanges, ColumnColor, ColumnId, ColumnTemplate},
    ports::{BoardEvent, KanbanStore, Permission},
};
use mockable::Clock;

/// Request payload for appending a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddColumnRequest {
    name: String,
    status: String,
    color: Option<String>,
}

impl AddColumnRequest {
    /// Creates a request for a column named `name` bound to `status`.
    #[must_use]
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            color: None,
        }
    }

    /// Sets the display color (`#rrggbb`).
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Request payload for renaming, recoloring, or repositioning a column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateColumnRequest {
    name: Option<String>,
    color: Option<String>,
    position: Option<u32>,
}

impl UpdateColumnRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the new name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the new display color (`#rrggbb`).
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Moves the column to `position`; siblings are renumbered around it.
    #[must_use]
    pub const fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }
}

/// Adds, edits, reorders, and deletes board columns.
#[derive(Clone)]
pub struct ColumnService<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    context: KanbanContext<S, C>,
}

impl<S, C> ColumnService<S, C>
where
    S: KanbanStore,
    C: Clock + Send + Sync,
{
    /// Creates a new column service.
    #[must_use]
    pub const fn new(context: KanbanContext<S, C>) -> Self {
        Self { context }
    }

    /// Lists a board's columns in position order.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-members, or a store error.
    pub async fn list_columns(
        &self,
        actor: &Actor,
        board_id: BoardId,
    ) -> KanbanServiceResult<Vec<Column>> {
        self.context.load_board(board_id).await?;
        self.context.require_member(board_id, actor).await?;
        Ok(self.context.store.list_columns(board_id).await?)
    }

    /// Appends a column after the board's last column.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input or a status that is
    /// already bound on the board.
    pub async fn add_column(
        &self,
        actor: &Actor,
        board_id: BoardId,
        request: AddColumnRequest,
    ) -> KanbanServiceResult<Column> {
        self.authorize(actor, board_id).await?;
        let template =
            ColumnTemplate::new(&request.name, &request.status, request.color.as_deref())?;
        let column = self
            .context
            .store
            .append_column(board_id, &template, self.context.clock.utc())
            .await?;
        tracing::info!(
            %board_id,
            column_id = %column.id(),
            status = %column.status(),
            position = column.position(),
            "column added"
        );
        self.changed(actor, board_id);
        Ok(column)
    }

    /// Renames, recolors, or repositions a column.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown column, a validation error
    /// for malformed input, or a store error.
    pub async fn update_column(
        &self,
        actor: &Actor,
        column_id: ColumnId,
        request: UpdateColumnRequest,
    ) -> KanbanServiceResult<Column> {
        let current = self.context.load_column(column_id).await?;
        self.authorize(actor, current.board_id()).await?;
        let changes = ColumnChanges {
            name: request.name,
            color: request.color.map(ColumnColor::new).transpose()?,
            position: request.position,
        };
        if changes.is_empty() {
            return Ok(current);
        }
        let column = self
            .context
            .store
            .update_column(column_id, &changes, self.context.clock.utc())
            .await?;
        tracing::info!(
            board_id = %column.board_id(),
            %column_id,
            position = column.position(),
            "column updated"
        );
        self.changed(actor, column.board_id());
        Ok(column)
    }

    /// Assigns `position = index` to each listed column.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless `ordered` names every column of the
    /// board exactly once.
    pub async fn reorder_columns(
        &self,
        actor: &Actor,
        board_id: BoardId,
        ordered: &[ColumnId],
    ) -> KanbanServiceResult<Vec<Column>> {
        self.authorize(actor, board_id).await?;
        let columns = self
            .context
            .store
            .reorder_columns(board_id, ordered, self.context.clock.utc())
            .await?;
        tracing::info!(%board_id, columns = columns.len(), "columns reordered");
        self.changed(actor, board_id);
        Ok(columns)
    }

    /// Deletes an empty column. Remaining columns keep their positions.
    ///
    /// # Errors
    ///
    /// Returns a conflict when the column still holds tasks.
    pub async fn delete_column(
        &self,
        actor: &Actor,
        column_id: ColumnId,
    ) -> KanbanServiceResult<Column> {
        let current = self.context.load_column(column_id).await?;
        self.authorize(actor, current.board_id()).await?;
        let column = self.context.store.delete_column(column_id).await?;
        tracing::info!(board_id = %column.board_id(), %column_id, "column deleted");
        self.changed(actor, column.board_id());
        Ok(column)
    }

    async fn authorize(&self, actor: &Actor, board_id: BoardId) -> KanbanServiceResult<()> {
        self.context.authorize(actor, Permission::ManageColumns)?;
        self.context.load_board(board_id).await?;
        self.context.require_member(board_id, actor).await?;
        Ok(())
    }

    fn changed(&self, actor: &Actor, board_id: BoardId) {
        self.context.notify(&BoardEvent::ColumnsChanged {
            board_id,
            actor: actor.user_id(),
        });
    }
}
