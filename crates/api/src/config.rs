//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `SERVICE_NAME`: source written on emitted events (default: `"agg-shipment-cmd"`)
/// - `DATABASE_URL`: PostgreSQL item store; in-memory when unset
/// - `REPLAY_TIMEOUT_SECS`: bound for establishing a replay stream (default: `10`)
/// - `ITEM_LOCK_LOT`: reject lot changes on update (default: `false`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub service_name: String,
    pub database_url: Option<String>,
    pub replay_timeout: Duration,
    pub lock_lot: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    ///
    /// Values that fail to parse are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT", defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            service_name: lookup("SERVICE_NAME")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.service_name),
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            replay_timeout: Duration::from_secs(parsed(
                &lookup,
                "REPLAY_TIMEOUT_SECS",
                defaults.replay_timeout.as_secs(),
            )),
            lock_lot: parsed(&lookup, "ITEM_LOCK_LOT", defaults.lock_lot),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, ?default, "invalid config value, using default");
            default
        }),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            service_name: "agg-shipment-cmd".to_string(),
            database_url: None,
            replay_timeout: Duration::from_secs(10),
            lock_lot: false,
        }
    }
}
