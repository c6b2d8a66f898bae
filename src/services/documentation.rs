use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Combo Rush Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::start_game,
        crate::routes::game::session_results,
        crate::routes::game::finish_game,
        crate::routes::leaderboard::leaderboard,
        crate::routes::leaderboard::player_profile,
        crate::routes::aggregate::recompute_day,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::StartGameRequest,
            crate::dto::game::StartGameResponse,
            crate::dto::game::FinishGameRequest,
            crate::dto::game::FinishGameResponse,
            crate::dto::game::SessionView,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::leaderboard::PlayerView,
            crate::dto::leaderboard::PlayerProfileResponse,
            crate::dto::aggregate::DailyAggregateView,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Session lifecycle operations"),
        (name = "leaderboard", description = "Leaderboards and player profiles"),
        (name = "aggregate", description = "Daily aggregate maintenance"),
    )
)]
pub struct ApiDoc;
