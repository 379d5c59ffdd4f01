//! Configuration for the exporter.
//!
//! Connection settings come from `NEO4J_*` environment variables when all of
//! URI, username and password are set; otherwise from a YAML file, which is
//! created with placeholder values if missing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use neo4j_pulse_common::config::{LoggingConfig, Neo4jConfig};

use crate::mapping::normalize_labels;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

const DEFAULT_CONFIG_YAML: &str = "\
neo4j:
  uri: http://localhost:7474
  username: neo4j
  password: password
  database: neo4j
";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Neo4j connection settings.
    #[serde(default)]
    pub neo4j: Neo4jConfig,

    /// HTTP endpoint settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to listen on (default: "0.0.0.0:4242").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Labels added to every sample.
    #[serde(default)]
    pub default_labels: HashMap<String, String>,
}

fn default_listen() -> String {
    "0.0.0.0:4242".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            default_labels: HashMap::new(),
        }
    }
}

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Environment,
    File(PathBuf),
    /// The file did not exist and was created with placeholders.
    Created(PathBuf),
}

impl ConfigSource {
    /// Short human-readable description, e.g. for the /info page.
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Environment => "NEO4J_* environment variables".to_string(),
            ConfigSource::File(path) | ConfigSource::Created(path) => {
                path.display().to_string()
            }
        }
    }

    /// Log where the configuration came from. Call once logging is set up.
    pub fn log(&self) {
        match self {
            ConfigSource::Environment => {
                info!("Using configuration from environment variables")
            }
            ConfigSource::File(path) => {
                info!(path = %path.display(), "Using configuration file")
            }
            ConfigSource::Created(path) => warn!(
                path = %path.display(),
                "Created default config file. Please update it with your Neo4j connection details."
            ),
        }
    }
}

impl ExporterConfig {
    /// Load configuration from the process environment or `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ConfigSource), ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load configuration using `env` to look up variables.
    pub fn load_with_env<F>(
        path: impl AsRef<Path>,
        env: F,
    ) -> Result<(Self, ConfigSource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(neo4j) = neo4j_from_env(&env) {
            let config = ExporterConfig {
                neo4j,
                ..Default::default()
            };
            config.validate()?;
            return Ok((config, ConfigSource::Environment));
        }

        let path = path.as_ref();
        let source = if path.exists() {
            ConfigSource::File(path.to_path_buf())
        } else {
            std::fs::write(path, DEFAULT_CONFIG_YAML)?;
            ConfigSource::Created(path.to_path_buf())
        };

        let config = Self::load_from_file(path)?;
        Ok((config, source))
    }

    /// Load configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = if content.trim().is_empty() {
            ExporterConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.neo4j
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if self.http.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.http.listen
            )));
        }

        normalize_labels(&self.http.default_labels).map_err(ConfigError::Validation)?;

        Ok(())
    }
}

/// Connection settings from `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD`
/// and the optional `NEO4J_DATABASE`.
fn neo4j_from_env<F>(env: &F) -> Option<Neo4jConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let uri = non_blank("NEO4J_URI")?;
    let username = non_blank("NEO4J_USERNAME")?;
    let password = non_blank("NEO4J_PASSWORD")?;
    let defaults = Neo4jConfig::default();

    Some(Neo4jConfig {
        uri,
        username,
        password,
        database: non_blank("NEO4J_DATABASE").unwrap_or(defaults.database),
        timeout_secs: defaults.timeout_secs,
    })
}
