//! Validated scalar values shared by boards, columns, and tasks.

use super::{KanbanDomainError, ParsePriorityError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest board name or task title, in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Longest column name, in characters.
pub const MAX_COLUMN_NAME_LEN: usize = 100;

/// Longest workflow status, in characters.
pub const MAX_STATUS_LEN: usize = 50;

/// Logical workflow status a column is bound to and a task mirrors.
///
/// Statuses are free-form per board (`todo`, `in_progress`, `done`, ...) but
/// normalized to lowercase `snake_case` so comparisons are stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskStatus(String);

impl TaskStatus {
    /// Status a task enters when it is reopened after review or completion.
    pub const REOPENED: &'static str = "reopened";

    /// Creates a validated status value.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::InvalidStatus`] when the value is empty
    /// or contains characters outside `[a-z0-9_]` after normalization, and
    /// [`KanbanDomainError::StatusTooLong`] past [`MAX_STATUS_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, KanbanDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_');
        if !is_valid {
            return Err(KanbanDomainError::InvalidStatus(raw));
        }
        within_limit(normalized, MAX_STATUS_LEN, KanbanDomainError::StatusTooLong).map(Self)
    }

    /// Returns the reopened sentinel status.
    #[must_use]
    pub fn reopened() -> Self {
        Self(Self::REOPENED.to_owned())
    }

    /// Returns `true` when this is the reopened sentinel.
    #[must_use]
    pub fn is_reopened(&self) -> bool {
        self.0 == Self::REOPENED
    }

    /// Returns the status as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = KanbanDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        value.0
    }
}

impl AsRef<str> for TaskStatus {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal priority.
    #[default]
    Medium,
    /// Should be picked up next.
    High,
    /// Blocks other work.
    Critical,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Display color of a column in `#rrggbb` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnColor(String);

impl ColumnColor {
    /// Neutral grey used when no color is given.
    pub const DEFAULT: &'static str = "#6c757d";

    /// Creates a validated color.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::InvalidColor`] unless the value is a `#`
    /// followed by exactly six hexadecimal digits.
    pub fn new(value: impl Into<String>) -> Result<Self, KanbanDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        let digits = normalized.strip_prefix('#').unwrap_or_default();
        if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(KanbanDomainError::InvalidColor(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the color as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ColumnColor {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl TryFrom<String> for ColumnColor {
    type Error = KanbanDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColumnColor> for String {
    fn from(value: ColumnColor) -> Self {
        value.0
    }
}

/// Amount of effort tracked in whole minutes.
///
/// Effort is accumulated in minutes so that ledger sums stay exact and is
/// reported in hours at the edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Effort(u32);

impl Effort {
    /// No effort.
    pub const ZERO: Self = Self(0);

    /// Creates an effort value from whole minutes.
    #[must_use]
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    /// Creates an effort value from fractional hours, rounded to the nearest
    /// minute.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::InvalidEffort`] when the value is
    /// negative, not finite, or exceeds the storable range.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "hours are validated to be finite and within u32 minutes before the cast"
    )]
    pub fn from_hours(hours: f64) -> Result<Self, KanbanDomainError> {
        let minutes = (hours * 60.0).round();
        if !minutes.is_finite() || minutes < 0.0 || minutes > f64::from(u32::MAX) {
            return Err(KanbanDomainError::InvalidEffort(hours.to_string()));
        }
        Ok(Self(minutes as u32))
    }

    /// Returns the effort in whole minutes.
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }

    /// Returns the effort in hours.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "hours are a presentation unit derived from exact minutes"
    )]
    pub fn as_hours(self) -> f64 {
        f64::from(self.0) / 60.0
    }

    /// Adds two effort values, saturating at the storable maximum.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h{:02}m", self.0.div_euclid(60), self.0.rem_euclid(60))
    }
}

/// Human-readable task code allocated from a board's task sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskCode(String);

impl TaskCode {
    /// Builds the code for sequence number `number` with the given prefix.
    #[must_use]
    pub fn from_sequence(prefix: &str, number: u64) -> Self {
        Self(format!("{prefix}-{number}"))
    }

    /// Wraps a code loaded from persistence.
    #[must_use]
    pub const fn from_persisted(code: String) -> Self {
        Self(code)
    }

    /// Returns the code as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns the trimmed value, or `None` when nothing remains.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Passes `value` through unless it has more than `max` characters.
pub(crate) fn within_limit(
    value: String,
    max: usize,
    too_long: fn(usize) -> KanbanDomainError,
) -> Result<String, KanbanDomainError> {
    if value.chars().count() > max {
        return Err(too_long(max));
    }
    Ok(value)
}
