/// Daily aggregate views.
pub mod aggregate;
/// Session start/finish payloads and views.
pub mod game;
/// Health check payloads.
pub mod health;
/// Leaderboard and player profile payloads.
pub mod leaderboard;
/// Validation helpers for DTOs.
pub mod validation;
