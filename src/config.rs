//! Server configuration from the environment

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Read `key` from the environment, falling back to `default` when the
/// variable is unset or unparseable
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment variable");
            default
        }),
        Err(_) => default,
    }
}

/// Where conversations are persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    Sqlite(PathBuf),
}

impl StoreLocation {
    fn parse(raw: &str) -> Self {
        if raw == ":memory:" {
            StoreLocation::Memory
        } else {
            StoreLocation::Sqlite(PathBuf::from(raw))
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub store: StoreLocation,
    pub cors_origin: String,
    pub max_hops: usize,
    pub tool_timeout: Duration,
    pub llm_max_attempts: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8001,
            store: StoreLocation::Sqlite(default_db_path()),
            cors_origin: "http://localhost:3000".to_string(),
            max_hops: 8,
            tool_timeout: Duration::from_secs(10),
            llm_max_attempts: 3,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("AIRLINE_PORT", defaults.port),
            store: std::env::var("AIRLINE_DB_PATH")
                .map_or(defaults.store, |raw| StoreLocation::parse(&raw)),
            cors_origin: std::env::var("AIRLINE_CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            max_hops: env_or("AIRLINE_MAX_HOPS", defaults.max_hops).max(1),
            tool_timeout: Duration::from_secs(env_or(
                "AIRLINE_TOOL_TIMEOUT_SECS",
                defaults.tool_timeout.as_secs(),
            )),
            llm_max_attempts: env_or("AIRLINE_LLM_MAX_ATTEMPTS", defaults.llm_max_attempts).max(1),
        }
    }
}

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".airline-agents")
        .join("conversations.db")
}
