//! Neo4j Pulse Common Library
//!
//! This crate provides shared types and utilities for the Neo4j Pulse exporter:
//!
//! - [`value`] - Loosely-typed query values (`RawValue`, `Record`)
//! - [`session`] - Neo4j client and scoped sessions over the HTTP Cypher endpoint
//! - [`config`] - Connection and logging configuration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod session;
pub mod value;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig, Neo4jConfig};
pub use error::{Error, Result};
pub use session::{Neo4jClient, Neo4jSession, QuerySession};
pub use value::{RawValue, Record};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
