//! HTTP server for the metrics endpoint.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::collector::SharedCollector;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    collector: SharedCollector,
    listen_addr: SocketAddr,
    config_source: Option<String>,
}

/// Create the HTTP router.
fn create_router(
    collector: SharedCollector,
    listen_addr: SocketAddr,
    config_source: Option<String>,
) -> Router {
    let state = AppState {
        collector,
        listen_addr,
        config_source,
    };

    Router::new()
        .route("/", get(metrics_handler))
        .route("/info", get(info_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for the metrics endpoint. Every request runs a fresh scrape.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.collector.collect().await {
        Ok(document) => (
            StatusCode::OK,
            [("content-type", CONTENT_TYPE)],
            document.encode(),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to collect metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain; charset=utf-8")],
                format!("Error collecting metrics: {}", e),
            )
                .into_response()
        }
    }
}

/// Handler for the /info endpoint.
async fn info_handler(State(state): State<AppState>) -> Response {
    let mut body = String::from(
        "Neo4j Pulse - Metrics Exporter for Neo4j\n\
         \n\
         Available endpoints:\n\
         - GET /       - Prometheus format metrics\n\
         - GET /info   - This page\n\
         - GET /health - Health check\n\
         \n",
    );

    if let Some(source) = &state.config_source {
        body.push_str(&format!("Configuration: {}\n", source));
    }
    body.push_str(&format!(
        "Database: {}\nListening on: {}\n",
        state.collector.client().database(),
        state.listen_addr
    ));

    (StatusCode::OK, body).into_response()
}

/// Handler for the /health endpoint. Does not touch the database.
async fn health_handler() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// HTTP server configuration.
pub struct HttpServer {
    collector: SharedCollector,
    listen_addr: SocketAddr,
    config_source: Option<String>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(collector: SharedCollector, listen_addr: SocketAddr) -> Self {
        Self {
            collector,
            listen_addr,
            config_source: None,
        }
    }

    /// Describe where the configuration came from on the /info page.
    pub fn with_config_source(mut self, source: impl Into<String>) -> Self {
        self.config_source = Some(source.into());
        self
    }

    /// Run the HTTP server until the shutdown signal is received.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until the shutdown signal is received.
    pub async fn serve(
        self,
        listener: tokio::net::TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let addr = listener.local_addr()?;
        let router = create_router(self.collector, addr, self.config_source);

        info!(addr = %addr, "Server listening");
        info!("Metrics endpoint: http://{}/", addr);
        info!("Info endpoint: http://{}/info", addr);
        info!("Health check: http://{}/health", addr);

        // Run server with graceful shutdown
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                // Wait for shutdown signal
                loop {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                    if *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
