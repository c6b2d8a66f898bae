/// Daily aggregate recomputation.
pub mod aggregate_service;
/// OpenAPI document definition.
pub mod documentation;
/// Session lifecycle orchestration (start, finish, results).
pub mod game_service;
/// Health check logic.
pub mod health_service;
/// Leaderboard and player profile queries.
pub mod leaderboard_service;
