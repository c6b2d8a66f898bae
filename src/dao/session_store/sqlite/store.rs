//! [`SessionStore`] implementation over a SQLite pool.
//!
//! Timestamps are stored as unix epoch milliseconds so window comparisons
//! and the `ended_at` tie-break stay plain integer comparisons; aggregate
//! dates are stored as `YYYY-MM-DD` text.

use futures::future::BoxFuture;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::dao::{
    models::{
        DailyAggregateEntity, DayStatsEntity, LeaderboardEntryEntity, NewSessionEntity,
        PlayerEntity, SessionEntity, SessionFinishEntity,
    },
    session_store::SessionStore,
    storage::{StorageError, StorageResult},
};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

const SESSION_COLUMNS: &str =
    "id, player_id, started_at, ended_at, score, duration_secs, hits, combos, device_info, ip_hash";

/// SQLite-backed session store.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Wrap an already connected and migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SessionStore for SqliteSessionStore {
    fn get_or_create_player(
        &self,
        name: String,
        created_at: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            // Unique name plus conflict-ignoring insert: racing callers all
            // converge on the same row.
            sqlx::query("INSERT INTO players (name, created_at) VALUES (?, ?) ON CONFLICT (name) DO NOTHING")
                .bind(&name)
                .bind(to_db_timestamp(created_at))
                .execute(&pool)
                .await
                .map_err(|err| StorageError::unavailable("inserting player".into(), err))?;

            let row = sqlx::query("SELECT id, name, created_at FROM players WHERE name = ?")
                .bind(&name)
                .fetch_one(&pool)
                .await
                .map_err(|err| StorageError::unavailable("fetching player by name".into(), err))?;

            player_from_row(&row)
        })
    }

    fn find_player(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row = sqlx::query("SELECT id, name, created_at FROM players WHERE id = ?")
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(|err| StorageError::unavailable("fetching player".into(), err))?;

            row.as_ref().map(player_from_row).transpose()
        })
    }

    fn create_session(
        &self,
        session: NewSessionEntity,
    ) -> BoxFuture<'static, StorageResult<SessionEntity>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query(
                "INSERT INTO game_sessions (player_id, started_at, ip_hash) VALUES (?, ?, ?)",
            )
            .bind(session.player_id)
            .bind(to_db_timestamp(session.started_at))
            .bind(&session.ip_hash)
            .execute(&pool)
            .await
            .map_err(|err| StorageError::unavailable("inserting session".into(), err))?;

            Ok(SessionEntity {
                id: result.last_insert_rowid(),
                player_id: session.player_id,
                started_at: session.started_at,
                ended_at: None,
                score: 0,
                duration_secs: None,
                hits: 0,
                combos: 0,
                device_info: String::new(),
                ip_hash: session.ip_hash,
            })
        })
    }

    fn find_session(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!("SELECT {SESSION_COLUMNS} FROM game_sessions WHERE id = ?");
            let row = sqlx::query(&sql)
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(|err| StorageError::unavailable("fetching session".into(), err))?;

            row.as_ref().map(session_from_row).transpose()
        })
    }

    fn finish_session(
        &self,
        id: i64,
        update: SessionFinishEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            // Conditional update: the `ended_at IS NULL` guard makes the
            // check and the write one atomic statement, so exactly one of
            // two concurrent finishes takes effect.
            let result = sqlx::query(
                "UPDATE game_sessions \
                 SET hits = ?, combos = ?, duration_secs = ?, score = ?, ended_at = ?, device_info = ? \
                 WHERE id = ? AND ended_at IS NULL",
            )
            .bind(i64::from(update.hits))
            .bind(i64::from(update.combos))
            .bind(update.duration_secs)
            .bind(i64::from(update.score))
            .bind(to_db_timestamp(update.ended_at))
            .bind(&update.device_info)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|err| StorageError::unavailable("finishing session".into(), err))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn top_scores(
        &self,
        since: Option<OffsetDateTime>,
        limit: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<LeaderboardEntryEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut sql = String::from(
                "SELECT s.id AS session_id, s.player_id, p.name AS player_name, s.score, s.ended_at \
                 FROM game_sessions s \
                 JOIN players p ON p.id = s.player_id \
                 WHERE s.ended_at IS NOT NULL",
            );
            if since.is_some() {
                sql.push_str(" AND s.ended_at >= ?");
            }
            sql.push_str(" ORDER BY s.score DESC, s.ended_at ASC LIMIT ?");

            let mut query = sqlx::query(&sql);
            if let Some(cutoff) = since {
                query = query.bind(to_db_timestamp(cutoff));
            }
            let rows = query
                .bind(i64::from(limit))
                .fetch_all(&pool)
                .await
                .map_err(|err| StorageError::unavailable("querying top scores".into(), err))?;

            rows.iter().map(leaderboard_entry_from_row).collect()
        })
    }

    fn player_best(
        &self,
        player_id: i64,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "SELECT {SESSION_COLUMNS} FROM game_sessions \
                 WHERE player_id = ? AND ended_at IS NOT NULL \
                 ORDER BY score DESC, ended_at ASC LIMIT 1"
            );
            let row = sqlx::query(&sql)
                .bind(player_id)
                .fetch_optional(&pool)
                .await
                .map_err(|err| StorageError::unavailable("querying player best".into(), err))?;

            row.as_ref().map(session_from_row).transpose()
        })
    }

    fn player_sessions(
        &self,
        player_id: i64,
        limit: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<SessionEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            // Unfinished sessions sort last (nulls-last rule).
            let sql = format!(
                "SELECT {SESSION_COLUMNS} FROM game_sessions \
                 WHERE player_id = ? \
                 ORDER BY score DESC, (ended_at IS NULL) ASC, ended_at ASC LIMIT ?"
            );
            let rows = sqlx::query(&sql)
                .bind(player_id)
                .bind(i64::from(limit))
                .fetch_all(&pool)
                .await
                .map_err(|err| StorageError::unavailable("querying player sessions".into(), err))?;

            rows.iter().map(session_from_row).collect()
        })
    }

    fn day_stats(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<DayStatsEntity>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT COALESCE(MAX(score), 0) AS best_score, \
                        COALESCE(AVG(score), 0.0) AS avg_score, \
                        COUNT(*) AS finished_count \
                 FROM game_sessions \
                 WHERE ended_at IS NOT NULL AND ended_at >= ? AND ended_at < ?",
            )
            .bind(to_db_timestamp(start))
            .bind(to_db_timestamp(end))
            .fetch_one(&pool)
            .await
            .map_err(|err| StorageError::unavailable("querying day stats".into(), err))?;

            Ok(DayStatsEntity {
                best_score: to_u32(row.try_get("best_score").map_err(decode_err)?)?,
                avg_score: row.try_get("avg_score").map_err(decode_err)?,
                finished_count: row.try_get::<i64, _>("finished_count").map_err(decode_err)?
                    as u64,
            })
        })
    }

    fn upsert_daily_aggregate(
        &self,
        aggregate: DailyAggregateEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO daily_aggregates (date, best_score, avg_score) VALUES (?, ?, ?) \
                 ON CONFLICT (date) DO UPDATE \
                 SET best_score = excluded.best_score, avg_score = excluded.avg_score",
            )
            .bind(to_db_date(aggregate.date)?)
            .bind(i64::from(aggregate.best_score))
            .bind(aggregate.avg_score)
            .execute(&pool)
            .await
            .map_err(|err| StorageError::unavailable("upserting daily aggregate".into(), err))?;

            Ok(())
        })
    }

    fn find_daily_aggregate(
        &self,
        date: Date,
    ) -> BoxFuture<'static, StorageResult<Option<DailyAggregateEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT date, best_score, avg_score FROM daily_aggregates WHERE date = ?",
            )
            .bind(to_db_date(date)?)
            .fetch_optional(&pool)
            .await
            .map_err(|err| StorageError::unavailable("fetching daily aggregate".into(), err))?;

            row.as_ref().map(aggregate_from_row).transpose()
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&pool)
                .await
                .map_err(|err| StorageError::unavailable("pinging database".into(), err))?;
            Ok(())
        })
    }
}

fn player_from_row(row: &SqliteRow) -> StorageResult<PlayerEntity> {
    Ok(PlayerEntity {
        id: row.try_get("id").map_err(decode_err)?,
        name: row.try_get("name").map_err(decode_err)?,
        created_at: from_db_timestamp(row.try_get("created_at").map_err(decode_err)?)?,
    })
}

fn session_from_row(row: &SqliteRow) -> StorageResult<SessionEntity> {
    let ended_at = row
        .try_get::<Option<i64>, _>("ended_at")
        .map_err(decode_err)?
        .map(from_db_timestamp)
        .transpose()?;

    Ok(SessionEntity {
        id: row.try_get("id").map_err(decode_err)?,
        player_id: row.try_get("player_id").map_err(decode_err)?,
        started_at: from_db_timestamp(row.try_get("started_at").map_err(decode_err)?)?,
        ended_at,
        score: to_u32(row.try_get("score").map_err(decode_err)?)?,
        duration_secs: row.try_get("duration_secs").map_err(decode_err)?,
        hits: to_u32(row.try_get("hits").map_err(decode_err)?)?,
        combos: to_u32(row.try_get("combos").map_err(decode_err)?)?,
        device_info: row.try_get("device_info").map_err(decode_err)?,
        ip_hash: row.try_get("ip_hash").map_err(decode_err)?,
    })
}

fn leaderboard_entry_from_row(row: &SqliteRow) -> StorageResult<LeaderboardEntryEntity> {
    Ok(LeaderboardEntryEntity {
        session_id: row.try_get("session_id").map_err(decode_err)?,
        player_id: row.try_get("player_id").map_err(decode_err)?,
        player_name: row.try_get("player_name").map_err(decode_err)?,
        score: to_u32(row.try_get("score").map_err(decode_err)?)?,
        ended_at: from_db_timestamp(row.try_get("ended_at").map_err(decode_err)?)?,
    })
}

fn aggregate_from_row(row: &SqliteRow) -> StorageResult<DailyAggregateEntity> {
    Ok(DailyAggregateEntity {
        date: from_db_date(row.try_get("date").map_err(decode_err)?)?,
        best_score: to_u32(row.try_get("best_score").map_err(decode_err)?)?,
        avg_score: row.try_get("avg_score").map_err(decode_err)?,
    })
}

fn to_db_timestamp(value: OffsetDateTime) -> i64 {
    (value.unix_timestamp_nanos() / 1_000_000) as i64
}

fn from_db_timestamp(millis: i64) -> StorageResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map_err(|err| StorageError::unavailable("timestamp out of range".into(), err))
}

fn to_db_date(date: Date) -> StorageResult<String> {
    date.format(&DATE_FORMAT)
        .map_err(|err| StorageError::unavailable("formatting date".into(), err))
}

fn from_db_date(value: String) -> StorageResult<Date> {
    Date::parse(&value, &DATE_FORMAT)
        .map_err(|err| StorageError::unavailable(format!("corrupt date `{value}`"), err))
}

fn to_u32(value: i64) -> StorageResult<u32> {
    u32::try_from(value)
        .map_err(|err| StorageError::unavailable(format!("value out of range: {value}"), err))
}

fn decode_err(err: sqlx::Error) -> StorageError {
    StorageError::unavailable("decoding row".into(), err)
}
