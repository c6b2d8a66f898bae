//! Application-level configuration loading.
//!
//! All runtime settings are resolved once at startup into an immutable
//! [`AppConfig`] that is handed to the shared state; nothing reads the
//! environment after boot.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use time::UtcOffset;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "COMBO_RUSH_CONFIG_PATH";

/// Default SQLite database location.
const DEFAULT_DATABASE_URL: &str = "sqlite://combo_rush.db";
/// Default HTTP port.
const DEFAULT_PORT: u16 = 8080;
/// Default length of one game in seconds.
const DEFAULT_GAME_LENGTH_SECS: u32 = 30;
/// Default interval between daily-aggregate recomputations, in seconds.
const DEFAULT_AGGREGATION_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Connection URL for the SQLite database.
    pub database_url: String,
    /// Length of one game in seconds; the scoring clamp derives from it.
    pub game_length_secs: u32,
    /// Fixed UTC offset, in minutes, used for "today"/"this week" boundaries.
    pub utc_offset_minutes: i16,
    /// Seconds between background daily-aggregate recomputations.
    pub aggregation_interval_secs: u64,
}

impl AppConfig {
    /// Load the configuration from disk and the environment.
    ///
    /// The JSON file (if present) provides the baseline; `PORT` and
    /// `DATABASE_URL` environment variables override it, matching how the
    /// server is usually deployed behind a container runtime.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    RawConfig::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                RawConfig::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                RawConfig::default()
            }
        };

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .or(raw.port)
            .unwrap_or(DEFAULT_PORT);
        let database_url = env::var("DATABASE_URL")
            .ok()
            .or(raw.database_url)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Self {
            port,
            database_url,
            game_length_secs: raw.game_length_secs.unwrap_or(DEFAULT_GAME_LENGTH_SECS),
            utc_offset_minutes: raw.utc_offset_minutes.unwrap_or(0),
            aggregation_interval_secs: raw
                .aggregation_interval_secs
                .unwrap_or(DEFAULT_AGGREGATION_INTERVAL_SECS),
        }
    }

    /// The deployment time zone as a [`UtcOffset`].
    ///
    /// An out-of-range offset falls back to UTC rather than failing a
    /// request mid-flight.
    pub fn utc_offset(&self) -> UtcOffset {
        UtcOffset::from_whole_seconds(i32::from(self.utc_offset_minutes) * 60)
            .unwrap_or(UtcOffset::UTC)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            game_length_secs: DEFAULT_GAME_LENGTH_SECS,
            utc_offset_minutes: 0,
            aggregation_interval_secs: DEFAULT_AGGREGATION_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    port: Option<u16>,
    database_url: Option<String>,
    game_length_secs: Option<u32>,
    utc_offset_minutes: Option<i16>,
    aggregation_interval_secs: Option<u64>,
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.game_length_secs, 30);
        assert_eq!(config.utc_offset_minutes, 0);
        assert_eq!(config.utc_offset(), UtcOffset::UTC);
    }

    #[test]
    fn test_utc_offset_minutes() {
        let config = AppConfig {
            utc_offset_minutes: 120,
            ..AppConfig::default()
        };
        assert_eq!(config.utc_offset().whole_hours(), 2);
    }

    #[test]
    fn test_raw_config_partial_json() {
        let raw: RawConfig = serde_json::from_str(r#"{"game_length_secs": 45}"#).unwrap();
        assert_eq!(raw.game_length_secs, Some(45));
        assert!(raw.port.is_none());
    }
}
