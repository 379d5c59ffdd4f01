//! Neo4j session management over the HTTP Cypher endpoint.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Neo4jConfig;
use crate::error::{Error, Result};
use crate::value::Record;

/// Capability to run a Cypher query and get its records back.
pub trait QuerySession {
    /// Run a single query against the session's database.
    fn run(&self, query: &str) -> impl Future<Output = Result<Vec<Record>>> + Send;
}

#[derive(Serialize)]
struct TxRequest<'a> {
    statements: Vec<Statement<'a>>,
}

#[derive(Serialize)]
struct Statement<'a> {
    statement: &'a str,
    #[serde(rename = "resultDataContents")]
    result_data_contents: [&'static str; 1],
}

#[derive(Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<ServerError>,
}

#[derive(Deserialize)]
struct StatementResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<DataRow>,
}

#[derive(Deserialize)]
struct DataRow {
    #[serde(default)]
    row: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ServerError {
    code: String,
    message: String,
}

/// Handle to a Neo4j server. Cheap to clone.
#[derive(Clone)]
pub struct Neo4jClient {
    http: reqwest::Client,
    endpoint: String,
    username: String,
    password: String,
    database: String,
    active_sessions: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl Neo4jClient {
    /// Create a client for the configured server. No request is made yet.
    pub fn new(config: &Neo4jConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}/db/{}/tx/commit",
            config.uri.trim_end_matches('/'),
            config.database
        );

        tracing::info!(
            uri = %config.uri,
            database = %config.database,
            username = %config.username,
            "Configured Neo4j client"
        );

        Ok(Self {
            http,
            endpoint,
            username: config.username.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
            active_sessions: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Database this client queries.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Open a session, checking that the server is reachable and accepts
    /// our credentials and database name.
    ///
    /// The session is released when dropped.
    pub async fn open_session(&self) -> Result<Neo4jSession> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Connection("client is closed".to_string()));
        }

        self.execute(Vec::new()).await?;

        let open = self.active_sessions.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(database = %self.database, open, "Session opened");

        Ok(Neo4jSession {
            client: self.clone(),
        })
    }

    /// Number of sessions currently open.
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::Acquire)
    }

    /// Shut the client down. Subsequent `open_session` calls fail.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!(
                database = %self.database,
                active_sessions = self.active_sessions(),
                "Neo4j client closed"
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn query(&self, query: &str) -> Result<Vec<Record>> {
        let mut results = self
            .execute(vec![Statement {
                statement: query,
                result_data_contents: ["row"],
            }])
            .await?;

        let Some(result) = results.pop() else {
            return Ok(Vec::new());
        };

        Ok(result
            .data
            .into_iter()
            .map(|row| Record::from_row(&result.columns, row.row))
            .collect())
    }

    /// Send one auto-commit batch of statements.
    async fn execute(&self, statements: Vec<Statement<'_>>) -> Result<Vec<StatementResult>> {
        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json;charset=UTF-8")
            .json(&TxRequest { statements })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: TxResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Query(format!(
                "Unexpected response from {} (HTTP {}): {}",
                self.endpoint, status, e
            ))
        })?;

        if let Some(err) = parsed.errors.into_iter().next() {
            return Err(Error::Query(format!("{}: {}", err.code, err.message)));
        }

        if !status.is_success() {
            return Err(Error::Query(format!(
                "HTTP {} from {}",
                status, self.endpoint
            )));
        }

        Ok(parsed.results)
    }
}

/// A scoped session. Each query runs in its own auto-commit transaction, so a
/// failing procedure call does not affect later queries.
pub struct Neo4jSession {
    client: Neo4jClient,
}

impl QuerySession for Neo4jSession {
    fn run(&self, query: &str) -> impl Future<Output = Result<Vec<Record>>> + Send {
        async move {
            tracing::trace!(query, "Running query");
            self.client.query(query).await
        }
    }
}

impl Drop for Neo4jSession {
    fn drop(&mut self) {
        let remaining = self
            .client
            .active_sessions
            .fetch_sub(1, Ordering::AcqRel)
            .saturating_sub(1);
        tracing::debug!(
            database = %self.client.database,
            open = remaining,
            "Session released"
        );
    }
}
