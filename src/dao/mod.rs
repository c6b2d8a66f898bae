/// Database model definitions.
pub mod models;
/// Session and leaderboard storage operations.
pub mod session_store;
/// Storage abstraction layer for database operations.
pub mod storage;
