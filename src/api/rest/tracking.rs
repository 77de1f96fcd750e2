use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::get;
use serde::Serialize;

use crate::error::AppError;
use crate::services::tracking_window::{self, TrackingWindow, WindowDecision};
use crate::state::AppState;
use crate::store::AssignmentStore;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/tracking/status/:driver_id", get(tracking_status))
}

#[derive(Serialize)]
struct TrackingStatusResponse {
    #[serde(flatten)]
    decision: WindowDecision,
    vehicle_id: String,
    route_id: Option<String>,
    window: Option<TrackingWindow>,
}

/// "Can I start tracking yet?" status for the driver app.
async fn tracking_status(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> Result<Json<TrackingStatusResponse>, AppError> {
    let assignment = state
        .assignments
        .active_for_driver(&driver_id)?
        .ok_or(AppError::NoActiveAssignment(driver_id))?;

    let decision = tracking_window::is_allowed(&assignment, tracking_window::local_now_minutes());
    let window = tracking_window::tracking_window(&assignment);

    Ok(Json(TrackingStatusResponse {
        decision,
        vehicle_id: assignment.vehicle_id,
        route_id: assignment.route_id,
        window,
    }))
}
