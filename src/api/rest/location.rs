use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::location::{GeoPoint, LatestPosition, LocationFix};
use crate::services::ingest::{BatchOutcome, FixSubmission, NearbyDriver, SubmitOutcome};
use crate::services::tracking_window;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/location/update", post(update_location))
        .route("/location/batch", post(batch_update))
        .route(
            "/location/live/:driver_id/:vehicle_id",
            get(live_location),
        )
        .route("/location/history/:driver_id", get(location_history))
        .route("/location/nearby", get(nearby_drivers))
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FixSubmission>,
) -> Result<Json<SubmitOutcome>, AppError> {
    let driver_id = payload.driver_id.clone();
    let start = Instant::now();

    let result = state
        .ingest
        .submit(payload, tracking_window::local_now_minutes());

    let outcome_label = match &result {
        Ok(_) => "accepted",
        Err(err) => err.code(),
    };
    state
        .metrics
        .ingest_latency_seconds
        .with_label_values(&[outcome_label])
        .observe(start.elapsed().as_secs_f64());
    state
        .metrics
        .fixes_total
        .with_label_values(&[outcome_label])
        .inc();

    let outcome = result?;
    if outcome.projection_updated {
        state
            .metrics
            .driver_speed_kmh
            .with_label_values(&[&driver_id])
            .set(outcome.speed_kmh);
    }

    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct BatchRequest {
    fixes: Vec<FixSubmission>,
}

async fn batch_update(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BatchRequest>,
) -> Result<Json<BatchOutcome>, AppError> {
    let outcome = state
        .ingest
        .submit_batch(payload.fixes, tracking_window::local_now_minutes())?;

    state
        .metrics
        .fixes_total
        .with_label_values(&["accepted"])
        .inc_by(outcome.processed as u64);

    Ok(Json(outcome))
}

async fn live_location(
    State(state): State<Arc<AppState>>,
    Path((driver_id, vehicle_id)): Path<(String, String)>,
) -> Result<Json<LatestPosition>, AppError> {
    let position = state
        .ingest
        .latest_position(&driver_id, &vehicle_id)?
        .ok_or(AppError::DriverLocationUnavailable(driver_id))?;

    Ok(Json(position))
}

#[derive(Deserialize)]
struct HistoryParams {
    limit: Option<usize>,
}

async fn location_history(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<LocationFix>>, AppError> {
    let fixes = state
        .ingest
        .history(&driver_id, params.limit.unwrap_or(50))?;

    Ok(Json(fixes))
}

#[derive(Deserialize)]
struct NearbyParams {
    lat: f64,
    lng: f64,
    radius_km: Option<f64>,
}

async fn nearby_drivers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<Vec<NearbyDriver>>, AppError> {
    let center = GeoPoint {
        lat: params.lat,
        lng: params.lng,
    };
    let drivers = state
        .ingest
        .nearby(center, params.radius_km.unwrap_or(5.0))?;

    Ok(Json(drivers))
}
