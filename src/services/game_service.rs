//! Session lifecycle orchestration: start, finish, results.

use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tracing::{debug, info};
use validator::Validate;

use crate::{
    dao::models::{NewSessionEntity, SessionFinishEntity},
    dto::game::{
        FinishGameRequest, FinishGameResponse, SessionView, StartGameRequest, StartGameResponse,
    },
    error::ServiceError,
    scoring::compute_score,
    state::SharedState,
};

/// Maximum stored length of the user agent string, in characters.
const DEVICE_INFO_MAX_LEN: usize = 255;

/// Validate the player name, get-or-create the player, and open a session.
///
/// The client address is hashed before anything is persisted; the raw
/// address never reaches the store.
pub async fn start_game(
    state: &SharedState,
    request: StartGameRequest,
    client_addr: &str,
) -> Result<StartGameResponse, ServiceError> {
    request.validate()?;
    let name = request.name.trim().to_string();

    let store = state.require_session_store().await?;
    let now = OffsetDateTime::now_utc();
    let player = store.get_or_create_player(name, now).await?;

    let session = store
        .create_session(NewSessionEntity {
            player_id: player.id,
            started_at: now,
            ip_hash: hash_client_addr(client_addr),
        })
        .await?;

    info!(
        session_id = session.id,
        player_id = player.id,
        "session started"
    );

    Ok(StartGameResponse {
        redirect_url: session_url(session.id),
        session_id: session.id,
    })
}

/// Complete a session from client telemetry, recomputing the score server
/// side.
///
/// Finishing is idempotent: a session that already ended is returned as-is,
/// and a concurrent finish that loses the atomic update falls back to the
/// same already-finished reply.
pub async fn finish_game(
    state: &SharedState,
    session_id: i64,
    request: FinishGameRequest,
    user_agent: Option<String>,
) -> Result<FinishGameResponse, ServiceError> {
    let store = state.require_session_store().await?;

    let Some(session) = store.find_session(session_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };
    if session.is_finished() {
        debug!(session_id, "finish ignored: session already ended");
        return Ok(FinishGameResponse::already_finished(session.score));
    }

    let hits = clamp_count(request.hits);
    let combos = clamp_count(request.combos);
    let duration = clamp_duration(request.duration);
    let time_left = (f64::from(state.config().game_length_secs) - duration).max(0.0);
    let score = compute_score(hits, combos, time_left);

    let update = SessionFinishEntity {
        hits,
        combos,
        duration_secs: duration,
        score,
        ended_at: OffsetDateTime::now_utc(),
        device_info: truncate_device_info(user_agent.as_deref().unwrap_or_default()),
    };

    if !store.finish_session(session_id, update).await? {
        // Lost the race against a concurrent finish: re-read and return the
        // idempotent reply.
        let Some(existing) = store.find_session(session_id).await? else {
            return Err(ServiceError::NotFound(format!(
                "session `{session_id}` not found"
            )));
        };
        debug!(session_id, "finish lost the race; returning existing score");
        return Ok(FinishGameResponse::already_finished(existing.score));
    }

    info!(session_id, score, hits, combos, "session finished");
    Ok(FinishGameResponse::completed(score, session_url(session_id)))
}

/// Fetch a session for the results page.
pub async fn session_results(
    state: &SharedState,
    session_id: i64,
) -> Result<SessionView, ServiceError> {
    let store = state.require_session_store().await?;
    let Some(session) = store.find_session(session_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };
    Ok(session.into())
}

/// SHA-256 hex digest of the raw client address.
fn hash_client_addr(addr: &str) -> String {
    hex::encode(Sha256::digest(addr.as_bytes()))
}

fn clamp_count(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

fn clamp_duration(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

fn truncate_device_info(user_agent: &str) -> String {
    user_agent.chars().take(DEVICE_INFO_MAX_LEN).collect()
}

/// Resource URL for a session; serves as both play and results target.
fn session_url(session_id: i64) -> String {
    format!("/games/{session_id}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
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

    fn start_request(name: &str) -> StartGameRequest {
        StartGameRequest { name: name.into() }
    }

    #[tokio::test]
    async fn test_start_game_creates_session_and_hashes_ip() {
        let state = test_state().await;

        let response = start_game(&state, start_request("  Alice "), "203.0.113.9")
            .await
            .unwrap();
        assert_eq!(response.redirect_url, format!("/games/{}", response.session_id));

        let store = state.require_session_store().await.unwrap();
        let session = store
            .find_session(response.session_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!session.is_finished());
        assert_eq!(
            session.ip_hash,
            "d861b7e91033ebc1c1e8e7af3929010158b3241b54ca87ef73e79c32f26400ec"
        );

        let player = store.find_player(session.player_id).await.unwrap().unwrap();
        assert_eq!(player.name, "Alice");
    }

    #[tokio::test]
    async fn test_start_game_reuses_player_by_name() {
        let state = test_state().await;

        let first = start_game(&state, start_request("Bob"), "127.0.0.1")
            .await
            .unwrap();
        let second = start_game(&state, start_request("Bob"), "127.0.0.1")
            .await
            .unwrap();
        assert_ne!(first.session_id, second.session_id);

        let store = state.require_session_store().await.unwrap();
        let one = store.find_session(first.session_id).await.unwrap().unwrap();
        let two = store.find_session(second.session_id).await.unwrap().unwrap();
        assert_eq!(one.player_id, two.player_id);
    }

    #[tokio::test]
    async fn test_start_game_rejects_invalid_names() {
        let state = test_state().await;

        for name in ["", "   ", &"x".repeat(31)] {
            let result = start_game(&state, start_request(name), "127.0.0.1").await;
            assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
        }
    }

    #[tokio::test]
    async fn test_finish_game_computes_score_and_is_idempotent() {
        let state = test_state().await;
        let started = start_game(&state, start_request("Alice"), "127.0.0.1")
            .await
            .unwrap();

        // 30-second game, 25s elapsed: 10*10 + 3*5 + 5 = 120.
        let request = FinishGameRequest {
            hits: 10,
            combos: 3,
            duration: 25.0,
        };
        let first = finish_game(&state, started.session_id, request, Some("agent".into()))
            .await
            .unwrap();
        assert_eq!(first.status, "ok");
        assert_eq!(first.score, 120);
        assert!(first.redirect_url.is_some());

        let replay = FinishGameRequest {
            hits: 50,
            combos: 50,
            duration: 0.0,
        };
        let second = finish_game(&state, started.session_id, replay, Some("other".into()))
            .await
            .unwrap();
        assert_eq!(second.status, "finished");
        assert_eq!(second.score, 120);
        assert!(second.redirect_url.is_none());

        let store = state.require_session_store().await.unwrap();
        let session = store
            .find_session(started.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.hits, 10);
        assert_eq!(session.combos, 3);
        assert_eq!(session.duration_secs, Some(25.0));
        assert_eq!(session.device_info, "agent");
    }

    #[tokio::test]
    async fn test_finish_game_clamps_telemetry() {
        let state = test_state().await;
        let started = start_game(&state, start_request("Alice"), "127.0.0.1")
            .await
            .unwrap();

        // Negative counts drop to zero; an over-long game leaves no bonus time.
        let request = FinishGameRequest {
            hits: -5,
            combos: -1,
            duration: 90.0,
        };
        let response = finish_game(&state, started.session_id, request, None)
            .await
            .unwrap();
        assert_eq!(response.score, 0);
    }

    #[tokio::test]
    async fn test_finish_game_unknown_session() {
        let state = test_state().await;
        let request = FinishGameRequest {
            hits: 1,
            combos: 1,
            duration: 1.0,
        };
        let result = finish_game(&state, 424242, request, None).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_session_results() {
        let state = test_state().await;
        let started = start_game(&state, start_request("Alice"), "127.0.0.1")
            .await
            .unwrap();

        let view = session_results(&state, started.session_id).await.unwrap();
        assert_eq!(view.id, started.session_id);
        assert!(view.ended_at.is_none());

        let missing = session_results(&state, 424242).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_truncate_device_info() {
        assert_eq!(truncate_device_info("short"), "short");
        let long = "a".repeat(300);
        assert_eq!(truncate_device_info(&long).chars().count(), 255);
    }
}
