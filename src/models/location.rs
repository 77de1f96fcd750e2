use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Latitude within [-90, 90], longitude within [-180, 180], both finite.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// One GPS observation submitted by a driver device. Immutable once
/// appended to the fix log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationFix {
    pub driver_id: String,
    pub vehicle_id: String,
    pub assignment_id: Uuid,
    pub position: GeoPoint,
    pub accuracy_m: f64,
    /// Device-reported speed; untrusted, kept for the record only.
    pub reported_speed_kmh: Option<f64>,
    /// Device clock at capture time. Only used for the ordering check.
    pub captured_at: DateTime<Utc>,
}

/// The single current-position record per (driver, vehicle) pair,
/// overwritten in place on each accepted fix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestPosition {
    pub driver_id: String,
    pub vehicle_id: String,
    pub position: GeoPoint,
    pub accuracy_m: f64,
    pub speed_kmh: f64,
    pub bearing_deg: u16,
    pub online: bool,
    pub fix_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
