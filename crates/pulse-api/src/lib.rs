//! Pulse API: REST surface over the synthetic dataset, the metrics
//! aggregator, and the insight engine.

pub mod handlers;
pub mod metrics;
pub mod middleware;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use pulse_data::Dataset;
use pulse_insight::RuleEngine;

/// Shared immutable server state. The dataset is generated once at
/// startup; every read derives from it.
pub struct AppState {
    pub dataset: Dataset,
    pub engine: RuleEngine,
    pub metrics: metrics::ApiMetrics,
}

impl AppState {
    pub fn new(seed: u64) -> Self {
        Self {
            dataset: Dataset::generate(seed),
            engine: RuleEngine::new(),
            metrics: metrics::ApiMetrics::new(),
        }
    }
}

pub async fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/publishers", get(handlers::list_publishers))
        .route("/api/publishers/{id}", get(handlers::get_publisher))
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/agents/{id}", get(handlers::get_agent))
        .route("/api/submissions", get(handlers::list_submissions))
        .route("/api/incidents", get(handlers::list_incidents))
        .route("/api/snapshots", get(handlers::list_snapshots))
        .route("/api/metrics", get(handlers::get_metrics))
        .route("/api/copilot", post(handlers::copilot))
        .route("/api/health", get(handlers::health))
        .route("/metrics", get(handlers::prometheus_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors())
        .with_state(state)
}

pub async fn run(addr: &str, seed: u64) {
    let state = Arc::new(AppState::new(seed));
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    tracing::info!("Pulse API listening on {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
