use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Neo4j connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neo4jConfig {
    /// Base URI of the Neo4j HTTP endpoint (e.g. "http://localhost:7474").
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Database to run queries against.
    #[serde(default = "default_database")]
    pub database: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_uri() -> String {
    "http://localhost:7474".to_string()
}

fn default_username() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            username: default_username(),
            password: default_password(),
            database: default_database(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Neo4jConfig {
    /// Validate connection settings.
    pub fn validate(&self) -> Result<()> {
        if !self.uri.starts_with("http://") && !self.uri.starts_with("https://") {
            return Err(Error::Config(format!(
                "Invalid Neo4j URI: '{}'. Expected an http:// or https:// endpoint",
                self.uri
            )));
        }

        if self.database.trim().is_empty() {
            return Err(Error::Config("database must not be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be > 0".to_string()));
        }

        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
