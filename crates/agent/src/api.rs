//! HTTP API for interface status and Prometheus metrics

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use linkpulse_lib::{AgentMetrics, InterfaceSnapshot, LinkAgent, LinkStatus};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub agent: RwLock<LinkAgent>,
    pub ready: RwLock<bool>,
    pub metrics: AgentMetrics,
}

impl AppState {
    pub fn new(agent: LinkAgent, metrics: AgentMetrics) -> Self {
        Self {
            agent: RwLock::new(agent),
            ready: RwLock::new(false),
            metrics,
        }
    }
}

/// Health report derived from the latest snapshots.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: LinkStatus,
    pub interfaces: BTreeMap<String, LinkStatus>,
}

impl HealthResponse {
    /// Worst-of aggregation: one Down interface makes the host report
    /// Down; otherwise one Degraded interface makes it Degraded.
    pub fn from_snapshots(snaps: &[InterfaceSnapshot]) -> Self {
        let mut status = LinkStatus::Healthy;
        let mut interfaces = BTreeMap::new();
        for snap in snaps {
            interfaces.insert(snap.iface.clone(), snap.status);
            match snap.status {
                LinkStatus::Down => status = LinkStatus::Down,
                LinkStatus::Degraded if status != LinkStatus::Down => {
                    status = LinkStatus::Degraded;
                }
                _ => {}
            }
        }
        Self { status, interfaces }
    }
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Returns 200 while every interface is at least operational, 503 once
/// any interface is Down.
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let agent = state.agent.read().await;
    let health = HealthResponse::from_snapshots(&agent.snapshots());

    let status_code = match health.status {
        LinkStatus::Healthy | LinkStatus::Degraded => StatusCode::OK,
        LinkStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ready = *state.ready.read().await;
    let response = if ready {
        ReadinessResponse {
            ready: true,
            reason: None,
        }
    } else {
        ReadinessResponse {
            ready: false,
            reason: Some("first tick has not completed".to_string()),
        }
    };

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

async fn snapshots(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let agent = state.agent.read().await;
    Json(agent.snapshots())
}

async fn summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let agent = state.agent.read().await;
    Json(agent.summary_ranked())
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("failed to encode metrics: {e}").into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/snapshots", get(snapshots))
        .route("/summary", get(summary))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Bind and serve the API until the process exits.
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Status API listening");
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
