//! Prometheus exporter for Neo4j.
//!
//! Every scrape opens one session against Neo4j, runs the collector
//! strategies in a fixed order, and renders their output as Prometheus text.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   Neo4j (HTTP)  │<────│    Collector    │<────│   HTTP Server   │
//! │  JMX/APOC/DBMS  │────>│  (strategies)   │────>│       (/)       │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! Strategies, in order: JVM (JMX beans), store sizes, transactions, active
//! queries, catalog counts. A strategy whose procedure is unavailable simply
//! contributes nothing.
//!
//! # Usage
//!
//! ```bash
//! neo4j-pulse --config config.yml
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod collector;
pub mod config;
pub mod exposition;
pub mod http;
pub mod mapping;
pub mod strategies;

pub use collector::{CollectError, MetricsCollector, SharedCollector, collect_from};
pub use config::ExporterConfig;
pub use exposition::{ExpositionDocument, MetricLine, MetricSet, SampleValue};
pub use http::HttpServer;
pub use mapping::MetricKind;
pub use strategies::Strategy;
