//! Time-windowed leaderboard queries and player profiles.

use time::{Duration, OffsetDateTime, Time};

use crate::{
    dto::{
        game::SessionView,
        leaderboard::{LeaderboardQuery, LeaderboardResponse, PlayerProfileResponse},
    },
    error::ServiceError,
    state::SharedState,
};

/// Number of entries in each leaderboard list.
const TOP_LIMIT: u32 = 10;
/// Number of sessions shown on a player profile.
const PROFILE_SESSION_LIMIT: u32 = 10;

/// Build the leaderboard page model: three top-10 lists plus the requesting
/// player's personal best.
///
/// A malformed or unknown `player_id` simply yields no personal best; the
/// page itself never fails on bad query input.
pub async fn leaderboard(
    state: &SharedState,
    query: LeaderboardQuery,
) -> Result<LeaderboardResponse, ServiceError> {
    let store = state.require_session_store().await?;

    let now = OffsetDateTime::now_utc().to_offset(state.config().utc_offset());
    let today = store
        .top_scores(Some(start_of_day(now)), TOP_LIMIT)
        .await?;
    let this_week = store
        .top_scores(Some(start_of_week(now)), TOP_LIMIT)
        .await?;
    let all_time = store.top_scores(None, TOP_LIMIT).await?;

    let my_best = match parse_player_id(query.player_id) {
        Some(player_id) => store.player_best(player_id).await?.map(SessionView::from),
        None => None,
    };

    Ok(LeaderboardResponse {
        today: today.into_iter().map(Into::into).collect(),
        this_week: this_week.into_iter().map(Into::into).collect(),
        all_time: all_time.into_iter().map(Into::into).collect(),
        my_best,
    })
}

/// A player record plus their ten best sessions.
pub async fn player_profile(
    state: &SharedState,
    player_id: i64,
) -> Result<PlayerProfileResponse, ServiceError> {
    let store = state.require_session_store().await?;

    let Some(player) = store.find_player(player_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "player `{player_id}` not found"
        )));
    };
    let sessions = store
        .player_sessions(player_id, PROFILE_SESSION_LIMIT)
        .await?;

    Ok(PlayerProfileResponse {
        player: player.into(),
        sessions: sessions.into_iter().map(Into::into).collect(),
    })
}

/// Local midnight of the day containing `now`, keeping its offset.
fn start_of_day(now: OffsetDateTime) -> OffsetDateTime {
    now.replace_time(Time::MIDNIGHT)
}

/// Local midnight of the Monday of the week containing `now`.
fn start_of_week(now: OffsetDateTime) -> OffsetDateTime {
    let days_since_monday = i64::from(now.date().weekday().number_days_from_monday());
    start_of_day(now) - Duration::days(days_since_monday)
}

fn parse_player_id(raw: Option<String>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

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

    async fn seed_finished(
        state: &SharedState,
        name: &str,
        score: u32,
        ended_at: OffsetDateTime,
    ) -> (i64, i64) {
        let store = state.require_session_store().await.unwrap();
        let player = store
            .get_or_create_player(name.into(), ended_at)
            .await
            .unwrap();
        let session = store
            .create_session(NewSessionEntity {
                player_id: player.id,
                started_at: ended_at,
                ip_hash: "b".repeat(64),
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
        (player.id, session.id)
    }

    #[test]
    fn test_start_of_day_keeps_offset() {
        let now = datetime!(2026-08-20 15:30:45 +02:00);
        let midnight = start_of_day(now);
        assert_eq!(midnight, datetime!(2026-08-20 00:00 +02:00));
        assert_eq!(midnight.offset(), now.offset());
    }

    #[test]
    fn test_start_of_week_lands_on_monday() {
        // 2026-08-20 is a Thursday.
        let thursday = datetime!(2026-08-20 15:30 UTC);
        assert_eq!(start_of_week(thursday), datetime!(2026-08-17 00:00 UTC));

        // A Monday maps to its own midnight.
        let monday = datetime!(2026-08-17 09:00 UTC);
        assert_eq!(start_of_week(monday), datetime!(2026-08-17 00:00 UTC));

        // A Sunday still belongs to the week started the previous Monday.
        let sunday = datetime!(2026-08-23 23:59 UTC);
        assert_eq!(start_of_week(sunday), datetime!(2026-08-17 00:00 UTC));
    }

    #[test]
    fn test_parse_player_id() {
        assert_eq!(parse_player_id(Some("7".into())), Some(7));
        assert_eq!(parse_player_id(Some(" 7 ".into())), Some(7));
        assert_eq!(parse_player_id(Some("abc".into())), None);
        assert_eq!(parse_player_id(Some(String::new())), None);
        assert_eq!(parse_player_id(None), None);
    }

    #[tokio::test]
    async fn test_leaderboard_windows_and_my_best() {
        let state = test_state().await;
        let now = OffsetDateTime::now_utc();

        let (alice_id, _) = seed_finished(&state, "Alice", 200, now).await;
        // Finished a month ago: all-time only.
        seed_finished(&state, "Bob", 300, now - Duration::days(30)).await;

        let response = leaderboard(
            &state,
            LeaderboardQuery {
                player_id: Some(alice_id.to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.today.len(), 1);
        assert_eq!(response.today[0].player, "Alice");
        assert_eq!(response.this_week.len(), 1);
        assert_eq!(response.all_time.len(), 2);
        assert_eq!(response.all_time[0].score, 300);

        let best = response.my_best.unwrap();
        assert_eq!(best.score, 200);
    }

    #[tokio::test]
    async fn test_leaderboard_tolerates_bad_player_id() {
        let state = test_state().await;

        let garbage = leaderboard(
            &state,
            LeaderboardQuery {
                player_id: Some("not-a-number".into()),
            },
        )
        .await
        .unwrap();
        assert!(garbage.my_best.is_none());

        let unknown = leaderboard(
            &state,
            LeaderboardQuery {
                player_id: Some("424242".into()),
            },
        )
        .await
        .unwrap();
        assert!(unknown.my_best.is_none());
    }

    #[tokio::test]
    async fn test_player_profile() {
        let state = test_state().await;
        let now = OffsetDateTime::now_utc();
        let (player_id, session_id) = seed_finished(&state, "Cara", 150, now).await;

        let profile = player_profile(&state, player_id).await.unwrap();
        assert_eq!(profile.player.name, "Cara");
        assert_eq!(profile.sessions.len(), 1);
        assert_eq!(profile.sessions[0].id, session_id);

        let missing = player_profile(&state, 424242).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }
}
