//! Scrape orchestration: one session, every strategy in order, one document.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use neo4j_pulse_common::{Neo4jClient, QuerySession};
use thiserror::Error;
use tracing::debug;

use crate::exposition::{ExpositionDocument, MetricLine};
use crate::mapping::normalize_labels;
use crate::strategies::Strategy;

/// Failure to produce a document at all.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("{0}")]
    Session(#[from] neo4j_pulse_common::Error),

    #[error("Invalid default label: {0}")]
    InvalidLabel(String),
}

/// Runs the collector strategies against a Neo4j server on demand.
pub struct MetricsCollector {
    client: Neo4jClient,
    default_labels: Vec<(String, String)>,
}

impl MetricsCollector {
    /// Create a collector. Label names are sanitized and sorted; a name that
    /// is not a valid Prometheus label is rejected.
    pub fn new(
        client: Neo4jClient,
        default_labels: &HashMap<String, String>,
    ) -> Result<Self, CollectError> {
        let default_labels =
            normalize_labels(default_labels).map_err(CollectError::InvalidLabel)?;

        Ok(Self {
            client,
            default_labels,
        })
    }

    pub fn client(&self) -> &Neo4jClient {
        &self.client
    }

    /// Open a session, run every strategy, and build a fresh document.
    ///
    /// Only a session failure is an error; failing strategies contribute no
    /// lines. The session is released before returning.
    pub async fn collect(&self) -> Result<ExpositionDocument, CollectError> {
        let session = self.client.open_session().await?;
        let document = collect_from(&session, &self.default_labels).await;
        drop(session);
        Ok(document)
    }

    /// Shut down the underlying client.
    pub fn close(&self) {
        self.client.close();
    }
}

/// Create a shareable collector handle.
pub type SharedCollector = Arc<MetricsCollector>;

/// Run all strategies in order against one session and merge their lines.
pub async fn collect_from<S: QuerySession>(
    session: &S,
    default_labels: &[(String, String)],
) -> ExpositionDocument {
    let mut lines = Vec::new();

    for strategy in Strategy::ALL {
        let set = strategy.collect(session).await;
        lines.extend(set.into_lines());
    }

    if !default_labels.is_empty() {
        apply_labels(&mut lines, default_labels);
    }

    let document = ExpositionDocument::new(Local::now(), lines);
    debug!(
        lines = document.metric_lines().len(),
        "Built exposition document"
    );
    document
}

fn apply_labels(lines: &mut [MetricLine], default_labels: &[(String, String)]) {
    for line in lines.iter_mut() {
        if let MetricLine::Sample { labels, .. } = line {
            for (k, v) in default_labels {
                if !labels.iter().any(|(lk, _)| lk == k) {
                    labels.push((k.clone(), v.clone()));
                }
            }
        }
    }
}
