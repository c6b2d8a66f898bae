/// SQLite-backed store implementation.
pub mod sqlite;

use futures::future::BoxFuture;
use time::{Date, OffsetDateTime};

use crate::dao::models::{
    DailyAggregateEntity, DayStatsEntity, LeaderboardEntryEntity, NewSessionEntity, PlayerEntity,
    SessionEntity, SessionFinishEntity,
};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for players, sessions and aggregates.
pub trait SessionStore: Send + Sync {
    /// Fetch the player with the given name, inserting it first if absent.
    ///
    /// Safe under concurrent callers: the name column is unique and the
    /// insert ignores conflicts, so two racing first-time starts resolve to
    /// the same row.
    fn get_or_create_player(
        &self,
        name: String,
        created_at: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<PlayerEntity>>;

    /// Look up a player by id.
    fn find_player(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;

    /// Insert a fresh in-progress session and return the stored row.
    fn create_session(
        &self,
        session: NewSessionEntity,
    ) -> BoxFuture<'static, StorageResult<SessionEntity>>;

    /// Look up a session by id.
    fn find_session(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;

    /// Atomically complete a session that is still in progress.
    ///
    /// Returns `true` when this call performed the write, `false` when the
    /// session was already finished (or does not exist) and nothing changed.
    fn finish_session(
        &self,
        id: i64,
        update: SessionFinishEntity,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Top finished sessions ordered by score descending then finish time
    /// ascending, optionally restricted to sessions finished at or after
    /// `since`, capped at `limit`.
    fn top_scores(
        &self,
        since: Option<OffsetDateTime>,
        limit: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<LeaderboardEntryEntity>>>;

    /// The highest-scoring finished session for a player, if any.
    fn player_best(
        &self,
        player_id: i64,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;

    /// A player's sessions ordered like the leaderboard, unfinished rows
    /// last, capped at `limit`.
    fn player_sessions(
        &self,
        player_id: i64,
        limit: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<SessionEntity>>>;

    /// Best/average/count over sessions finished in `[start, end)`.
    fn day_stats(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<DayStatsEntity>>;

    /// Insert or overwrite the aggregate row for its date.
    fn upsert_daily_aggregate(
        &self,
        aggregate: DailyAggregateEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Look up the aggregate row for a date.
    fn find_daily_aggregate(
        &self,
        date: Date,
    ) -> BoxFuture<'static, StorageResult<Option<DailyAggregateEntity>>>;

    /// Cheap connectivity probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
