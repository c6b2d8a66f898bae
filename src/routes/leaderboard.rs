use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::leaderboard::{LeaderboardQuery, LeaderboardResponse, PlayerProfileResponse},
    error::AppError,
    services::leaderboard_service,
    state::SharedState,
};

/// Routes serving leaderboards and player profiles.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/leaderboard", get(leaderboard))
        .route("/players/{id}", get(player_profile))
}

/// The three time-windowed top-10 lists plus an optional personal best.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard page model", body = LeaderboardResponse)
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let response = leaderboard_service::leaderboard(&state, query).await?;
    Ok(Json(response))
}

/// A player record plus their ten best sessions.
#[utoipa::path(
    get,
    path = "/players/{id}",
    tag = "leaderboard",
    params(("id" = i64, Path, description = "Identifier of the player")),
    responses(
        (status = 200, description = "Player found", body = PlayerProfileResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn player_profile(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<PlayerProfileResponse>, AppError> {
    let response = leaderboard_service::player_profile(&state, id).await?;
    Ok(Json(response))
}
