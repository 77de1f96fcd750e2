use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::models::sos::SosAlert;
use crate::state::AppState;
use crate::store::ActiveAlertStore;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sos", post(raise_alert))
        .route("/sos/:id/resolve", post(resolve_alert))
        .route("/sos/active", get(all_active_alerts))
        .route("/sos/active/:driver_id", get(active_alerts_for_driver))
        .route("/sos/history", get(alert_history))
}

#[derive(Deserialize)]
struct RaiseAlertRequest {
    driver_id: String,
    vehicle_id: String,
    lat: f64,
    lng: f64,
    message: Option<String>,
}

async fn raise_alert(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RaiseAlertRequest>,
) -> Result<Json<SosAlert>, AppError> {
    let alert = state.sos.raise(
        &payload.driver_id,
        &payload.vehicle_id,
        GeoPoint {
            lat: payload.lat,
            lng: payload.lng,
        },
        payload.message,
    )?;

    refresh_active_gauge(&state);
    Ok(Json(alert))
}

async fn resolve_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SosAlert>, AppError> {
    let alert = state.sos.resolve(id)?;

    refresh_active_gauge(&state);
    Ok(Json(alert))
}

async fn all_active_alerts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SosAlert>>, AppError> {
    Ok(Json(state.sos.list_all_active()?))
}

async fn active_alerts_for_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> Result<Json<Vec<SosAlert>>, AppError> {
    Ok(Json(state.sos.list_active_for_driver(&driver_id)?))
}

#[derive(Deserialize)]
struct HistoryParams {
    driver_id: Option<String>,
    limit: Option<usize>,
}

async fn alert_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<SosAlert>>, AppError> {
    let alerts = state
        .sos
        .history(params.driver_id.as_deref(), params.limit.unwrap_or(20))?;

    Ok(Json(alerts))
}

fn refresh_active_gauge(state: &AppState) {
    if let Ok(active) = state.active_alerts.all() {
        state.metrics.active_sos_alerts.set(active.len() as i64);
    }
}
