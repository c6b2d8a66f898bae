use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};

use crate::{
    dao::models::{LeaderboardEntryEntity, PlayerEntity},
    dto::game::SessionView,
};

/// Query parameters accepted by the leaderboard endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// Player whose personal best should be highlighted.
    ///
    /// Carried as a string so malformed values degrade to "no personal
    /// best" instead of rejecting the whole page.
    pub player_id: Option<String>,
}

/// One ranked row of a leaderboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// Session the score belongs to.
    pub session_id: i64,
    /// Owning player identifier.
    pub player_id: i64,
    /// Player display name.
    pub player: String,
    /// Final score.
    pub score: u32,
    /// Finish timestamp, the tie-breaker on equal scores.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub ended_at: OffsetDateTime,
}

impl From<LeaderboardEntryEntity> for LeaderboardEntry {
    fn from(entity: LeaderboardEntryEntity) -> Self {
        Self {
            session_id: entity.session_id,
            player_id: entity.player_id,
            player: entity.player_name,
            score: entity.score,
            ended_at: entity.ended_at,
        }
    }
}

/// The three time-windowed top-10 lists plus an optional personal best.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Sessions finished since local midnight.
    pub today: Vec<LeaderboardEntry>,
    /// Sessions finished since Monday of the current week.
    pub this_week: Vec<LeaderboardEntry>,
    /// All finished sessions.
    pub all_time: Vec<LeaderboardEntry>,
    /// Highest-scoring finished session of the requested player, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_best: Option<SessionView>,
}

/// Public projection of a player.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerView {
    /// Player identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// When the player first appeared.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
}

impl From<PlayerEntity> for PlayerView {
    fn from(entity: PlayerEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_at: entity.created_at,
        }
    }
}

/// A player together with their ten best sessions.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerProfileResponse {
    /// The player record.
    pub player: PlayerView,
    /// Up to ten sessions, best first.
    pub sessions: Vec<SessionView>,
}
