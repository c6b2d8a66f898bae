//! SQLite persistence backend built on `sqlx`.

mod connection;
mod store;

pub use connection::{connect, connect_in_memory};
pub use store::SqliteSessionStore;
