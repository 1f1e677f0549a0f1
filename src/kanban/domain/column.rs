//! Board columns and the default column template.

use super::{
    BoardId, ColumnColor, ColumnId, KanbanDomainError, TaskStatus,
    values::{MAX_COLUMN_NAME_LEN, non_empty, within_limit},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered bucket on a board, bound to one logical task status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    board_id: BoardId,
    name: String,
    status: TaskStatus,
    position: u32,
    color: ColumnColor,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedColumnData {
    /// Persisted column identifier.
    pub id: ColumnId,
    /// Owning board.
    pub board_id: BoardId,
    /// Persisted display name.
    pub name: String,
    /// Bound logical status.
    pub status: TaskStatus,
    /// Persisted position within the board.
    pub position: u32,
    /// Persisted display color.
    pub color: ColumnColor,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Column {
    /// Creates a column at `position` on `board_id`.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::EmptyColumnName`] when the name is blank
    /// and [`KanbanDomainError::ColumnNameTooLong`] when it is too long.
    pub fn new(
        board_id: BoardId,
        template: &ColumnTemplate,
        position: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, KanbanDomainError> {
        let name = column_name(&template.name)?;
        Ok(Self {
            id: ColumnId::new(),
            board_id,
            name,
            status: template.status.clone(),
            position,
            color: template.color.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstructs a column from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedColumnData) -> Self {
        Self {
            id: data.id,
            board_id: data.board_id,
            name: data.name,
            status: data.status,
            position: data.position,
            color: data.color,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bound logical status.
    #[must_use]
    pub const fn status(&self) -> &TaskStatus {
        &self.status
    }

    /// Returns the position within the board.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Returns the display color.
    #[must_use]
    pub const fn color(&self) -> &ColumnColor {
        &self.color
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renames the column.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::EmptyColumnName`] when the name is blank
    /// and [`KanbanDomainError::ColumnNameTooLong`] when it is too long.
    pub fn rename(&mut self, name: &str, now: DateTime<Utc>) -> Result<(), KanbanDomainError> {
        self.name = column_name(name)?;
        self.updated_at = now;
        Ok(())
    }

    /// Changes the display color.
    pub fn recolor(&mut self, color: ColumnColor, now: DateTime<Utc>) {
        self.color = color;
        self.updated_at = now;
    }

    /// Moves the column to `position`. Callers renumber siblings.
    pub const fn set_position(&mut self, position: u32, now: DateTime<Utc>) {
        self.position = position;
        self.updated_at = now;
    }
}

/// Name, status binding, and color used to seed a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTemplate {
    /// Display name.
    pub name: String,
    /// Bound logical status.
    pub status: TaskStatus,
    /// Display color.
    #[serde(default)]
    pub color: ColumnColor,
}

impl ColumnTemplate {
    /// Creates a template from raw values.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError`] when the name is blank or the status or
    /// color is malformed.
    pub fn new(
        name: &str,
        status: &str,
        color: Option<&str>,
    ) -> Result<Self, KanbanDomainError> {
        let validated_name = column_name(name)?;
        let validated_color = color.map(ColumnColor::new).transpose()?.unwrap_or_default();
        Ok(Self {
            name: validated_name,
            status: TaskStatus::new(status)?,
            color: validated_color,
        })
    }

    /// Returns the stock five-column workflow seeded onto new boards.
    #[must_use]
    pub fn default_set() -> Vec<Self> {
        [
            ("To Do", "todo", "#6c757d"),
            ("In Progress", "in_progress", "#0d6efd"),
            ("Review", "review", "#6f42c1"),
            ("Testing", "testing", "#fd7e14"),
            ("Done", "done", "#198754"),
        ]
        .into_iter()
        .filter_map(|(name, status, color)| Self::new(name, status, Some(color)).ok())
        .collect()
    }
}

/// Partial update of a column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnChanges {
    /// New display name.
    pub name: Option<String>,
    /// New display color.
    pub color: Option<ColumnColor>,
    /// New position within the board; siblings are renumbered around it.
    pub position: Option<u32>,
}

impl ColumnChanges {
    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.position.is_none()
    }
}

/// Returns the column bound to `status`, preferring the leftmost one.
#[must_use]
pub fn column_for_status<'a>(columns: &'a [Column], status: &TaskStatus) -> Option<&'a Column> {
    columns
        .iter()
        .filter(|column| column.status() == status)
        .min_by_key(|column| (column.position(), column.id()))
}

/// Returns the position a column appended to `columns` receives.
///
/// Deleted columns leave gaps, so the next position follows the highest
/// one rather than the count.
#[must_use]
pub fn next_column_position(columns: &[Column]) -> u32 {
    columns
        .iter()
        .map(Column::position)
        .max()
        .map_or(0, |highest| highest.saturating_add(1))
}

/// Computes the column order after moving `column_id` to `position`.
///
/// `columns` may be in any order and may contain position gaps; the result
/// lists the identifiers in their new left-to-right order, so assigning
/// `position = index` yields a dense sequence.
#[must_use]
pub fn resequence_columns(columns: &[Column], column_id: ColumnId, position: u32) -> Vec<ColumnId> {
    let mut ordered: Vec<&Column> = columns.iter().collect();
    ordered.sort_by_key(|column| (column.position(), column.id()));
    let mut ids: Vec<ColumnId> = ordered
        .into_iter()
        .map(Column::id)
        .filter(|id| *id != column_id)
        .collect();
    let index = usize::try_from(position).map_or(ids.len(), |p| p.min(ids.len()));
    ids.insert(index, column_id);
    ids
}

/// Checks that `requested` names every column of `columns` exactly once.
#[must_use]
pub fn is_complete_column_order(columns: &[Column], requested: &[ColumnId]) -> bool {
    let mut expected: Vec<ColumnId> = columns.iter().map(Column::id).collect();
    let mut given = requested.to_vec();
    expected.sort_unstable();
    given.sort_unstable();
    expected == given
}

fn column_name(name: &str) -> Result<String, KanbanDomainError> {
    let trimmed = non_empty(name).ok_or(KanbanDomainError::EmptyColumnName)?;
    within_limit(trimmed, MAX_COLUMN_NAME_LEN, KanbanDomainError::ColumnNameTooLong)
}
