use std::net::SocketAddr;

use axum::{
    Form, Json, Router,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header::USER_AGENT},
    routing::{get, post},
};

use crate::{
    dto::game::{
        FinishGameRequest, FinishGameResponse, SessionView, StartGameRequest, StartGameResponse,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling the session lifecycle (start, results, finish).
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(start_game))
        .route("/games/{id}", get(session_results))
        .route("/games/{id}/finish", post(finish_game))
}

/// Start a new session for the submitted player name.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body(content = StartGameRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session created", body = StartGameResponse),
        (status = 400, description = "Invalid player name")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(payload): Form<StartGameRequest>,
) -> Result<Json<StartGameResponse>, AppError> {
    let client_addr = addr.ip().to_string();
    let response = game_service::start_game(&state, payload, &client_addr).await?;
    Ok(Json(response))
}

/// Fetch the results view of a session.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = i64, Path, description = "Identifier of the session")),
    responses(
        (status = 200, description = "Session found", body = SessionView),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn session_results(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<SessionView>, AppError> {
    let view = game_service::session_results(&state, id).await?;
    Ok(Json(view))
}

/// Complete a session from client telemetry; idempotent across repeats.
#[utoipa::path(
    post,
    path = "/games/{id}/finish",
    tag = "game",
    params(("id" = i64, Path, description = "Identifier of the session")),
    request_body = FinishGameRequest,
    responses(
        (status = 200, description = "Session finished (or already was)", body = FinishGameResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn finish_game(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<FinishGameRequest>,
) -> Result<Json<FinishGameResponse>, AppError> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let response = game_service::finish_game(&state, id, payload, user_agent).await?;
    Ok(Json(response))
}
