pub mod eta;
pub mod location;
pub mod sos;
pub mod tracking;
pub mod ws;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::state::AppState;
use crate::store::{ActiveAlertStore, LatestPositionStore};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(location::router())
        .merge(tracking::router())
        .merge(eta::router())
        .merge(sos::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws/alerts", get(ws::alerts_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    tracked_vehicles: usize,
    active_sos_alerts: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let tracked_vehicles = state.latest_positions.all().map(|v| v.len()).unwrap_or(0);
    let active_sos_alerts = state.active_alerts.all().map(|v| v.len()).unwrap_or(0);

    Json(HealthResponse {
        status: "ok",
        tracked_vehicles,
        active_sos_alerts,
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
