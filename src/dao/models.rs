use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// A human player identified by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Primary key of the player.
    pub id: i64,
    /// Display name, at most 30 characters, unique.
    pub name: String,
    /// Creation timestamp, set once when the row is first inserted.
    pub created_at: OffsetDateTime,
}

/// A single play session belonging to a player.
///
/// `ended_at` is `None` exactly while the session is in progress; once set it
/// never changes, and `score`, `hits`, `combos`, `duration_secs` and
/// `device_info` are final.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEntity {
    /// Primary key of the session.
    pub id: i64,
    /// Owning player; sessions are deleted with their player.
    pub player_id: i64,
    /// When the session was started.
    pub started_at: OffsetDateTime,
    /// When the session was finished, if it has been.
    pub ended_at: Option<OffsetDateTime>,
    /// Final score, 0 while in progress.
    pub score: u32,
    /// Elapsed play time in seconds, set at completion.
    pub duration_secs: Option<f64>,
    /// Number of targets hit.
    pub hits: u32,
    /// Number of combo bonuses achieved.
    pub combos: u32,
    /// Truncated user agent captured at completion.
    pub device_info: String,
    /// SHA-256 hex digest of the client address; the raw address is never stored.
    pub ip_hash: String,
}

impl SessionEntity {
    /// Whether this session has been completed.
    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Fields required to insert a fresh session row.
#[derive(Debug, Clone)]
pub struct NewSessionEntity {
    /// Owning player.
    pub player_id: i64,
    /// Start timestamp.
    pub started_at: OffsetDateTime,
    /// Pre-computed SHA-256 hex digest of the client address.
    pub ip_hash: String,
}

/// Fields written exactly once when a session is completed.
#[derive(Debug, Clone)]
pub struct SessionFinishEntity {
    /// Number of targets hit.
    pub hits: u32,
    /// Number of combo bonuses achieved.
    pub combos: u32,
    /// Elapsed play time in seconds.
    pub duration_secs: f64,
    /// Server-computed final score.
    pub score: u32,
    /// Completion timestamp.
    pub ended_at: OffsetDateTime,
    /// Truncated user agent string.
    pub device_info: String,
}

/// One leaderboard row: a finished session joined with its player's name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntryEntity {
    /// Session the score belongs to.
    pub session_id: i64,
    /// Owning player.
    pub player_id: i64,
    /// Player display name at query time.
    pub player_name: String,
    /// Final score.
    pub score: u32,
    /// Completion timestamp used as the tie-breaker.
    pub ended_at: OffsetDateTime,
}

/// Pre-computed best/average score for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyAggregateEntity {
    /// Calendar day the row aggregates, unique.
    pub date: Date,
    /// Highest score among sessions finished that day, 0 if none.
    pub best_score: u32,
    /// Mean score among sessions finished that day, 0.0 if none.
    pub avg_score: f64,
}

/// Aggregate figures computed over the finished sessions of one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayStatsEntity {
    /// Maximum score, 0 when no session finished in the window.
    pub best_score: u32,
    /// Mean score, 0.0 when no session finished in the window.
    pub avg_score: f64,
    /// Number of finished sessions in the window.
    pub finished_count: u64,
}
