//! HTTP exposition server.
//!
//! Serves the Prometheus registry on `/metrics` and a liveness probe
//! on `/healthz`. The server only ever reads the registry; all pipeline
//! state stays inside the exporter task.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::metrics::P1Metrics;

/// Application state shared across handlers
pub struct AppState {
    pub metrics: Arc<P1Metrics>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(metrics: Arc<P1Metrics>) -> Self {
        Self {
            metrics,
            start_time: Instant::now(),
        }
    }
}

type AppStateArc = Arc<AppState>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

pub fn router(state: AppStateArc) -> Router {
    Router::new()
        .route("/metrics", get(serve_metrics))
        .route("/healthz", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until it fails.
pub async fn run(listen: &str, state: AppState) -> Result<()> {
    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("Listening on http://{}", listen);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn serve_metrics(State(state): State<AppStateArc>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        state.metrics.export(),
    )
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
