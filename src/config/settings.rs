//! Application settings loaded from environment variables.

use std::env;

use sea_orm::IsolationLevel;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT,
};
use crate::types::FaultMapping;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Isolation level for every transaction boundary; `None` keeps the store default.
    pub isolation_level: Option<IsolationLevel>,
    pub server_host: String,
    pub server_port: u16,
    /// Status used for generic failures on list endpoints.
    pub fault_mapping: FaultMapping,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("isolation_level", &self.isolation_level)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("fault_mapping", &self.fault_mapping)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            isolation_level: None,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            fault_mapping: FaultMapping::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let isolation_level = env::var("DB_ISOLATION_LEVEL")
            .ok()
            .and_then(|v| {
                let parsed = parse_isolation_level(&v);
                if parsed.is_none() {
                    tracing::warn!("Unknown DB_ISOLATION_LEVEL '{}', using store default", v);
                }
                parsed
            });

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MIN_CONNECTIONS),
            isolation_level,
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            fault_mapping: env::var("FAULT_STATUS_MAP")
                .map(|v| FaultMapping::from_setting(&v))
                .unwrap_or_default(),
        }
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parse an isolation level name such as `read_committed` or `SERIALIZABLE`.
pub fn parse_isolation_level(value: &str) -> Option<IsolationLevel> {
    match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
        "read_uncommitted" => Some(IsolationLevel::ReadUncommitted),
        "read_committed" => Some(IsolationLevel::ReadCommitted),
        "repeatable_read" => Some(IsolationLevel::RepeatableRead),
        "serializable" => Some(IsolationLevel::Serializable),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_isolation_level_names() {
        assert!(matches!(
            parse_isolation_level("read_committed"),
            Some(IsolationLevel::ReadCommitted)
        ));
        assert!(matches!(
            parse_isolation_level("Repeatable Read"),
            Some(IsolationLevel::RepeatableRead)
        ));
        assert!(matches!(
            parse_isolation_level("SERIALIZABLE"),
            Some(IsolationLevel::Serializable)
        ));
        assert!(parse_isolation_level("snapshot").is_none());
    }

    #[test]
    fn server_addr_joins_host_and_port() {
        let config = Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8081,
            ..Config::default()
        };
        assert_eq!(config.server_addr(), "127.0.0.1:8081");
        assert_eq!(Config::default().server_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn debug_output_redacts_database_url() {
        let config = Config::default();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("postgres://"));
    }
}
