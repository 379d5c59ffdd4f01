use thiserror::Error;

/// Common error type for Neo4j Pulse components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Connection(e.to_string())
    }
}

/// Result type alias using Neo4j Pulse's Error.
pub type Result<T> = std::result::Result<T, Error>;
