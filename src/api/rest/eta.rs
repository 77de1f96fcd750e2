use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use chrono::{Local, Timelike};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::services::eta::{LiveEta, PointToPointEta, RouteEta, Waypoint};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/eta/calculate", post(calculate_eta))
        .route("/eta/route", post(route_eta))
        .route("/eta/live/:driver_id/:vehicle_id", get(live_eta))
}

#[derive(Deserialize)]
struct CalculateRequest {
    from: GeoPoint,
    to: GeoPoint,
    speed_kmh: Option<f64>,
}

async fn calculate_eta(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CalculateRequest>,
) -> Result<Json<PointToPointEta>, AppError> {
    let result = state.eta.point_to_point(
        payload.from,
        payload.to,
        payload.speed_kmh.unwrap_or(state.default_speed_kmh),
        Local::now().hour(),
    )?;

    Ok(Json(result))
}

#[derive(Deserialize)]
struct RouteRequest {
    waypoints: Vec<Waypoint>,
    speed_kmh: Option<f64>,
}

async fn route_eta(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RouteRequest>,
) -> Result<Json<RouteEta>, AppError> {
    let result = state.eta.route_waypoints(
        &payload.waypoints,
        payload.speed_kmh.unwrap_or(state.default_speed_kmh),
        Local::now().hour(),
    )?;

    Ok(Json(result))
}

#[derive(Deserialize)]
struct LiveEtaParams {
    to_lat: f64,
    to_lng: f64,
    speed_kmh: Option<f64>,
}

async fn live_eta(
    State(state): State<Arc<AppState>>,
    Path((driver_id, vehicle_id)): Path<(String, String)>,
    Query(params): Query<LiveEtaParams>,
) -> Result<Json<LiveEta>, AppError> {
    let result = state.eta.live_to_destination(
        &driver_id,
        &vehicle_id,
        GeoPoint {
            lat: params.to_lat,
            lng: params.to_lng,
        },
        params.speed_kmh.unwrap_or(state.default_speed_kmh),
        Local::now().hour(),
    )?;

    Ok(Json(result))
}
