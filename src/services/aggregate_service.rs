//! Daily aggregate recomputation, on demand and on a timer.

use std::time::Duration;

use time::{Date, OffsetDateTime};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    dao::models::DailyAggregateEntity, dto::aggregate::DailyAggregateView, error::ServiceError,
    state::SharedState,
};

/// Recompute the aggregate row for one local calendar day.
///
/// Scans finished sessions whose `ended_at` falls inside the day and
/// overwrites the `DailyAggregate` row, so re-running is always safe.
pub async fn recompute_day(
    state: &SharedState,
    date: Date,
) -> Result<DailyAggregateView, ServiceError> {
    let store = state.require_session_store().await?;
    let offset = state.config().utc_offset();

    let start = date.midnight().assume_offset(offset);
    let next = date
        .next_day()
        .ok_or_else(|| ServiceError::InvalidInput(format!("date `{date}` out of range")))?;
    let end = next.midnight().assume_offset(offset);

    let stats = store.day_stats(start, end).await?;
    let aggregate = DailyAggregateEntity {
        date,
        best_score: stats.best_score,
        avg_score: stats.avg_score,
    };
    store.upsert_daily_aggregate(aggregate.clone()).await?;

    debug!(
        %date,
        best_score = aggregate.best_score,
        finished = stats.finished_count,
        "daily aggregate recomputed"
    );
    Ok(aggregate.into())
}

/// Periodically recompute yesterday's and today's aggregates.
///
/// Yesterday is included so the day that just rolled over still gets a final
/// pass. Failures are logged and retried on the next tick.
pub async fn run_aggregation_loop(state: SharedState) {
    let interval = Duration::from_secs(state.config().aggregation_interval_secs.max(1));

    loop {
        sleep(interval).await;

        let today = OffsetDateTime::now_utc()
            .to_offset(state.config().utc_offset())
            .date();
        for date in [today.previous_day(), Some(today)].into_iter().flatten() {
            if let Err(err) = recompute_day(&state, date).await {
                warn!(error = %err, %date, "daily aggregate recomputation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::{date, datetime};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::models::{NewSessionEntity, SessionFinishEntity},
        dao::session_store::sqlite::{SqliteSessionStore, connect_in_memory},
        state::AppState,
    };

    async fn test_state() -> SharedState {
        let state = AppState::new(AppConfig::default());
        let pool = connect_in_memory().await.expect("in-memory database");
        state
            .install_session_store(Arc::new(SqliteSessionStore::new(pool)))
            .await;
        state
    }

    async fn seed_finished(state: &SharedState, score: u32, ended_at: OffsetDateTime) {
        let store = state.require_session_store().await.unwrap();
        let player = store
            .get_or_create_player("Eve".into(), ended_at)
            .await
            .unwrap();
        let session = store
            .create_session(NewSessionEntity {
                player_id: player.id,
                started_at: ended_at,
                ip_hash: "c".repeat(64),
            })
            .await
            .unwrap();
        store
            .finish_session(
                session.id,
                SessionFinishEntity {
                    hits: 0,
                    combos: 0,
                    duration_secs: 30.0,
                    score,
                    ended_at,
                    device_info: String::new(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_recompute_empty_day_is_zero() {
        let state = test_state().await;
        let view = recompute_day(&state, date!(2026 - 08 - 20)).await.unwrap();
        assert_eq!(view.best_score, 0);
        assert_eq!(view.avg_score, 0.0);
    }

    #[tokio::test]
    async fn test_recompute_day_is_idempotent() {
        let state = test_state().await;
        let day = date!(2026 - 08 - 20);
        seed_finished(&state, 100, datetime!(2026-08-20 10:00 UTC)).await;
        seed_finished(&state, 50, datetime!(2026-08-20 23:59 UTC)).await;
        // Next day, must not count.
        seed_finished(&state, 500, datetime!(2026-08-21 00:00 UTC)).await;

        let first = recompute_day(&state, day).await.unwrap();
        assert_eq!(first.best_score, 100);
        assert_eq!(first.avg_score, 75.0);

        let second = recompute_day(&state, day).await.unwrap();
        assert_eq!(second.best_score, first.best_score);
        assert_eq!(second.avg_score, first.avg_score);

        let store = state.require_session_store().await.unwrap();
        let stored = store.find_daily_aggregate(day).await.unwrap().unwrap();
        assert_eq!(stored.best_score, 100);
        assert_eq!(stored.avg_score, 75.0);
    }

    #[tokio::test]
    async fn test_recompute_uses_local_offset() {
        let state = AppState::new(AppConfig {
            utc_offset_minutes: 120,
            ..AppConfig::default()
        });
        let pool = connect_in_memory().await.expect("in-memory database");
        state
            .install_session_store(Arc::new(SqliteSessionStore::new(pool)))
            .await;

        // 23:00 UTC on the 19th is 01:00 on the 20th at +02:00.
        seed_finished(&state, 80, datetime!(2026-08-19 23:00 UTC)).await;

        let view = recompute_day(&state, date!(2026 - 08 - 20)).await.unwrap();
        assert_eq!(view.best_score, 80);
        let previous = recompute_day(&state, date!(2026 - 08 - 19)).await.unwrap();
        assert_eq!(previous.best_score, 0);
    }
}
