//! Pool construction and schema migration for the SQLite backend.

use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use crate::dao::storage::{StorageError, StorageResult};

/// Versioned schema scripts embedded at compile time.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 5;

/// Open (creating the file if needed) and migrate the database at `url`.
pub async fn connect(url: &str) -> StorageResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|err| StorageError::unavailable(format!("invalid database url `{url}`"), err))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(|err| StorageError::unavailable(format!("connecting to `{url}`"), err))?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Open a private in-memory database, used by tests and local experiments.
///
/// A single connection keeps every caller on the same in-memory database;
/// SQLite gives each new `:memory:` connection its own.
pub async fn connect_in_memory() -> StorageResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|err| StorageError::unavailable("invalid in-memory url".into(), err))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(|err| StorageError::unavailable("opening in-memory database".into(), err))?;

    run_migrations(&pool).await?;
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> StorageResult<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|err| StorageError::unavailable("running migrations".into(), err))
}
