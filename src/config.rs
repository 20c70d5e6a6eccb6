use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://lectures.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Longest wait for an instructor's exclusive section before giving up.
    pub lock_timeout: Duration,
    /// Longest wait on SQLite's own write lock inside a section.
    pub busy_timeout: Duration,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::Config(format!("DB_MAX_CONNECTIONS must be a positive integer, got {:?}", raw))
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let lock_timeout = millis(&lookup, "SCHEDULE_LOCK_TIMEOUT_MS", DEFAULT_LOCK_TIMEOUT_MS)?;
        let busy_timeout = millis(&lookup, "DB_BUSY_TIMEOUT_MS", DEFAULT_BUSY_TIMEOUT_MS)?;

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            lock_timeout,
            busy_timeout,
        })
    }
}

fn millis<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let ms = match lookup(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| AppError::Config(format!("{} must be milliseconds, got {:?}", key, raw)))?,
        None => default,
    };
    Ok(Duration::from_millis(ms))
}
