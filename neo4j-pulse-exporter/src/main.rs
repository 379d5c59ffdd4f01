//! Prometheus exporter for Neo4j.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use neo4j_pulse_common::{Neo4jClient, init_tracing};
use neo4j_pulse_exporter::config::DEFAULT_CONFIG_FILE;
use neo4j_pulse_exporter::{ExporterConfig, HttpServer, MetricsCollector};

/// Prometheus exporter for Neo4j.
#[derive(Parser, Debug)]
#[command(name = "neo4j-pulse")]
#[command(about = "Export Neo4j JVM, store, transaction and catalog metrics for Prometheus")]
#[command(version)]
struct Args {
    /// Path to configuration file (YAML format). Created if missing.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error). Overrides config.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let (mut config, source) = ExporterConfig::load(&args.config)?;

    if let Some(listen) = args.listen {
        config.http.listen = listen;
        config.validate()?;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    // Initialize logging
    init_tracing(&config.logging)?;

    info!("Neo4j Pulse - Metric Exporter for Neo4j");
    source.log();

    let listen_addr: SocketAddr = config
        .http
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Create the collector
    let client = Neo4jClient::new(&config.neo4j)?;
    let collector = Arc::new(MetricsCollector::new(client, &config.http.default_labels)?);

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Start HTTP server
    let http_server =
        HttpServer::new(collector.clone(), listen_addr).with_config_source(source.describe());
    let mut http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(shutdown_rx).await {
            error!("HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal, or the server failing on its own
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = &mut http_task => {
            collector.close();
            anyhow::bail!("HTTP server exited unexpectedly");
        }
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    // Wait for the server to drain
    let _ = tokio::time::timeout(Duration::from_secs(5), http_task).await;

    collector.close();
    info!("Exporter stopped");
    Ok(())
}

#[cfg(unix)]
async fn terminate() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
