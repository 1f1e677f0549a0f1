//! Timer sessions of the time ledger.

use super::{Effort, TaskId, TimeLogId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One start/stop timer session for a (task, user) pair.
///
/// A session is `Active` from [`TimeLogEntry::start`] until
/// [`TimeLogEntry::stop`]; stopping fixes `ended_at` and the rounded
/// duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLogEntry {
    id: TimeLogId,
    task_id: TaskId,
    user_id: UserId,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    duration: Option<Effort>,
}

/// Parameter object for reconstructing a persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTimeLogData {
    /// Session identifier.
    pub id: TimeLogId,
    /// Timed task.
    pub task_id: TaskId,
    /// Timing user.
    pub user_id: UserId,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// Stop timestamp, absent while active.
    pub ended_at: Option<DateTime<Utc>>,
    /// Rounded duration, absent while active.
    pub duration: Option<Effort>,
}

impl TimeLogEntry {
    /// Opens a session at `now`.
    #[must_use]
    pub fn start(task_id: TaskId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: TimeLogId::new(),
            task_id,
            user_id,
            started_at: now,
            ended_at: None,
            duration: None,
        }
    }

    /// Reconstructs a session from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTimeLogData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            user_id: data.user_id,
            started_at: data.started_at,
            ended_at: data.ended_at,
            duration: data.duration,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> TimeLogId {
        self.id
    }

    /// Returns the timed task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the timing user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the start timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the stop timestamp, if stopped.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Returns the rounded duration, if stopped.
    #[must_use]
    pub const fn duration(&self) -> Option<Effort> {
        self.duration
    }

    /// Returns `true` until the session is stopped.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Closes the session at `now` and returns the elapsed effort.
    ///
    /// Stopping an already closed session returns its recorded duration
    /// without changing it.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Effort {
        if let Some(duration) = self.duration {
            return duration;
        }
        let duration = rounded_minutes(self.started_at, now);
        self.ended_at = Some(now);
        self.duration = Some(duration);
        duration
    }
}

/// Elapsed whole minutes between two instants, rounded half up. A stop
/// before the start (clock skew) counts as zero.
#[must_use]
pub fn rounded_minutes(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Effort {
    let seconds = (ended_at - started_at).num_seconds().max(0);
    let minutes = seconds.saturating_add(30).div_euclid(60);
    Effort::from_minutes(u32::try_from(minutes).unwrap_or(u32::MAX))
}
