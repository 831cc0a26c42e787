use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::state::{FlowRecord, FlowState};

pub struct AppState {
    pub flows: Arc<FlowState>,
    pub start_time: Instant,
}

// ── Prometheus Metrics ────────────────────────────────────────────────────────

struct Metrics {
    registry: Registry,
    active_flows: Gauge,
    observed_packets: Gauge,
}

impl Metrics {
    fn new() -> Self {
        let mut registry = Registry::default();
        let active_flows = Gauge::default();
        let observed_packets = Gauge::default();

        registry.register(
            "ioamflow_active_flows",
            "Flows currently present in the stats map",
            active_flows.clone(),
        );
        registry.register(
            "ioamflow_observed_packets",
            "Sum of per-flow packet counters",
            observed_packets.clone(),
        );

        Self {
            registry,
            active_flows,
            observed_packets,
        }
    }
}

// ── Response Types ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    flows: usize,
}

#[derive(Serialize)]
struct StatsResponse {
    uptime_seconds: u64,
    flows: usize,
    total_packets: u64,
    last_refresh_ms: i64,
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    let metrics = Arc::new(Metrics::new());

    Router::new()
        .route("/api/flows", get(get_flows))
        .route("/api/stats", get(get_stats))
        .route("/api/health", get(get_health))
        .route(
            "/metrics",
            get({
                let m = metrics.clone();
                let s = state.clone();
                move || get_metrics(s.clone(), m.clone())
            }),
        )
        .with_state(state)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn get_flows(State(state): State<Arc<AppState>>) -> Json<Vec<FlowRecord>> {
    Json(state.flows.records())
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        uptime_seconds: state.start_time.elapsed().as_secs(),
        flows: state.flows.flow_count(),
        total_packets: state.flows.total_packets(),
        last_refresh_ms: state.flows.last_refresh_ms(),
    })
}

async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        flows: state.flows.flow_count(),
    })
}

async fn get_metrics(state: Arc<AppState>, metrics: Arc<Metrics>) -> impl IntoResponse {
    metrics.active_flows.set(state.flows.flow_count() as i64);
    metrics
        .observed_packets
        .set(state.flows.total_packets() as i64);

    let mut body = String::new();
    match encode(&mut body, &metrics.registry) {
        Ok(()) => (
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
