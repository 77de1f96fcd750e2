use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::services::tracking_window::WindowDecision;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid fix: {0}")]
    InvalidFix(String),

    #[error("no active assignment for driver {0}")]
    NoActiveAssignment(String),

    #[error("{}", .0.reason)]
    TrackingWindowClosed(WindowDecision),

    #[error("no live location for driver {0}")]
    DriverLocationUnavailable(String),

    #[error("alert {0} not found")]
    AlertNotFound(Uuid),

    #[error("alert {0} is already resolved")]
    AlertAlreadyResolved(Uuid),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code; callers branch on this, not on the
    /// human-readable message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidFix(_) => "INVALID_FIX",
            AppError::NoActiveAssignment(_) => "NO_ACTIVE_ASSIGNMENT",
            AppError::TrackingWindowClosed(_) => "TRACKING_WINDOW_CLOSED",
            AppError::DriverLocationUnavailable(_) => "DRIVER_LOCATION_UNAVAILABLE",
            AppError::AlertNotFound(_) => "ALERT_NOT_FOUND",
            AppError::AlertAlreadyResolved(_) => "ALERT_ALREADY_RESOLVED",
            AppError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::StorageUnavailable(msg),
            StoreError::InvariantViolated(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidFix(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NoActiveAssignment(_)
            | AppError::DriverLocationUnavailable(_)
            | AppError::AlertNotFound(_) => StatusCode::NOT_FOUND,
            AppError::TrackingWindowClosed(_) => StatusCode::FORBIDDEN,
            AppError::AlertAlreadyResolved(_) => StatusCode::CONFLICT,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = json!({
            "code": self.code(),
            "error": self.to_string(),
        });

        // Window denials carry their timing metadata; it is part of the
        // driver-facing contract, not debug detail.
        if let AppError::TrackingWindowClosed(decision) = &self {
            if let Some(wait) = &decision.time_until_start {
                body["time_until_start"] = json!(wait);
            }
            if let Some(elapsed) = &decision.time_after_end {
                body["time_after_end"] = json!(elapsed);
            }
        }

        (status, Json(body)).into_response()
    }
}
