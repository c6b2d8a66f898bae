use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{dao::models::SessionEntity, dto::validation::validate_player_name};

/// Form payload used to start a new game session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartGameRequest {
    /// Player display name, 1-30 characters once trimmed.
    pub name: String,
}

impl Validate for StartGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_player_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Response to a successful game start.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartGameResponse {
    /// Identifier of the freshly created session.
    pub session_id: i64,
    /// Play page for the new session.
    pub redirect_url: String,
}

/// Telemetry posted by the client when the game ends.
///
/// Missing fields default to zero and negative values are clamped server
/// side; the score is always recomputed from these inputs, never trusted.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinishGameRequest {
    /// Number of targets hit.
    #[serde(default)]
    pub hits: i64,
    /// Number of combo bonuses achieved.
    #[serde(default)]
    pub combos: i64,
    /// Elapsed play time in seconds.
    #[serde(default)]
    pub duration: f64,
}

/// Response to a finish call, idempotent across repeats.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinishGameResponse {
    /// `"ok"` when this call completed the session, `"finished"` when it
    /// already was.
    pub status: String,
    /// Final score of the session.
    pub score: u32,
    /// Results page, present only on the first completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl FinishGameResponse {
    /// Reply for the call that actually completed the session.
    pub fn completed(score: u32, redirect_url: String) -> Self {
        Self {
            status: "ok".to_string(),
            score,
            redirect_url: Some(redirect_url),
        }
    }

    /// Reply for a session that was already finished.
    pub fn already_finished(score: u32) -> Self {
        Self {
            status: "finished".to_string(),
            score,
            redirect_url: None,
        }
    }
}

/// Public projection of a session, used by the results page and profiles.
///
/// The IP hash is deliberately absent.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionView {
    /// Session identifier.
    pub id: i64,
    /// Owning player identifier.
    pub player_id: i64,
    /// Start timestamp.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub started_at: OffsetDateTime,
    /// Finish timestamp, absent while in progress.
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>)]
    pub ended_at: Option<OffsetDateTime>,
    /// Final score.
    pub score: u32,
    /// Elapsed play time in seconds.
    pub duration_secs: Option<f64>,
    /// Number of targets hit.
    pub hits: u32,
    /// Number of combo bonuses achieved.
    pub combos: u32,
    /// Truncated user agent captured at completion.
    pub device_info: String,
}

impl From<SessionEntity> for SessionView {
    fn from(entity: SessionEntity) -> Self {
        Self {
            id: entity.id,
            player_id: entity.player_id,
            started_at: entity.started_at,
            ended_at: entity.ended_at,
            score: entity.score,
            duration_secs: entity.duration_secs,
            hits: entity.hits,
            combos: entity.combos,
            device_info: entity.device_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_request_validation() {
        assert!(StartGameRequest { name: "Ada".into() }.validate().is_ok());
        assert!(
            StartGameRequest {
                name: "  ".into()
            }
            .validate()
            .is_err()
        );
        assert!(
            StartGameRequest {
                name: "x".repeat(31)
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_finish_request_defaults() {
        let request: FinishGameRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.hits, 0);
        assert_eq!(request.combos, 0);
        assert_eq!(request.duration, 0.0);
    }

    #[test]
    fn test_finish_response_shapes() {
        let ok = FinishGameResponse::completed(120, "/games/7".into());
        assert_eq!(ok.status, "ok");
        assert_eq!(ok.redirect_url.as_deref(), Some("/games/7"));

        let done = FinishGameResponse::already_finished(120);
        assert_eq!(done.status, "finished");
        assert!(done.redirect_url.is_none());
        let body = serde_json::to_value(&done).unwrap();
        assert!(body.get("redirect_url").is_none());
    }
}
