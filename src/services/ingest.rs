use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AppError;
use crate::geo;
use crate::models::location::{GeoPoint, LatestPosition, LocationFix};
use crate::services::tracking_window;
use crate::store::{AssignmentStore, FixLogStore, LatestPositionStore};

/// A candidate fix as submitted by a driver device. The assignment id is
/// resolved server-side; the capture timestamp defaults to the server
/// clock when the device omits it.
#[derive(Debug, Clone, Deserialize)]
pub struct FixSubmission {
    pub driver_id: String,
    pub vehicle_id: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub accuracy_m: f64,
    pub reported_speed_kmh: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub accepted: bool,
    pub speed_kmh: f64,
    pub bearing_deg: u16,
    /// False when the fix was older than the stored projection and only
    /// landed in the history log.
    pub projection_updated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyDriver {
    #[serde(flatten)]
    pub position: LatestPosition,
    pub distance_km: f64,
}

pub struct LocationIngestService {
    assignments: Arc<dyn AssignmentStore>,
    fix_log: Arc<dyn FixLogStore>,
    latest: Arc<dyn LatestPositionStore>,
}

impl LocationIngestService {
    pub fn new(
        assignments: Arc<dyn AssignmentStore>,
        fix_log: Arc<dyn FixLogStore>,
        latest: Arc<dyn LatestPositionStore>,
    ) -> Self {
        Self {
            assignments,
            fix_log,
            latest,
        }
    }

    /// Accept one fix: validate, enforce the tracking window, derive
    /// kinematics against the stored projection, append to the fix log
    /// and upsert the projection.
    ///
    /// `now_minutes` is the local wall clock for the window gate, passed
    /// in so callers (and tests) control the instant being judged.
    pub fn submit(
        &self,
        submission: FixSubmission,
        now_minutes: u32,
    ) -> Result<SubmitOutcome, AppError> {
        validate(&submission)?;

        let assignment = self
            .assignments
            .active_for_driver(&submission.driver_id)?
            .ok_or_else(|| AppError::NoActiveAssignment(submission.driver_id.clone()))?;

        let decision = tracking_window::is_allowed(&assignment, now_minutes);
        if !decision.allowed {
            debug!(
                driver_id = %submission.driver_id,
                reason = %decision.reason,
                "fix rejected by tracking window"
            );
            return Err(AppError::TrackingWindowClosed(decision));
        }

        let position = GeoPoint {
            lat: submission.lat,
            lng: submission.lng,
        };
        let captured_at = submission.captured_at.unwrap_or_else(Utc::now);
        let prev = self
            .latest
            .get(&submission.driver_id, &submission.vehicle_id)?;

        // Ordering defense: only a strictly newer capture timestamp may
        // advance the projection. Stale retries still reach the log.
        let (speed_kmh, bearing_deg, fresh) = match &prev {
            Some(p) if captured_at > p.fix_at => {
                let distance = geo::distance_meters(&p.position, &position);
                let dt_secs = (captured_at - p.fix_at).num_milliseconds() as f64 / 1000.0;
                let speed = if dt_secs > 0.0 {
                    round2((distance / dt_secs) * 3.6)
                } else {
                    0.0
                };
                let bearing = geo::bearing_degrees(&p.position, &position).round() as u16 % 360;
                (speed, bearing, true)
            }
            Some(_) => (0.0, 0, false),
            None => (0.0, 0, true),
        };

        let fix = LocationFix {
            driver_id: submission.driver_id.clone(),
            vehicle_id: submission.vehicle_id.clone(),
            assignment_id: assignment.id,
            position,
            accuracy_m: submission.accuracy_m,
            reported_speed_kmh: submission.reported_speed_kmh,
            captured_at,
        };
        self.fix_log.append(fix)?;

        if fresh {
            self.latest.upsert(LatestPosition {
                driver_id: submission.driver_id.clone(),
                vehicle_id: submission.vehicle_id.clone(),
                position,
                accuracy_m: submission.accuracy_m,
                speed_kmh,
                bearing_deg,
                online: true,
                fix_at: captured_at,
                updated_at: Utc::now(),
            })?;

            info!(
                driver_id = %submission.driver_id,
                vehicle_id = %submission.vehicle_id,
                lat = submission.lat,
                lng = submission.lng,
                speed_kmh,
                "fix accepted"
            );
        } else {
            info!(
                driver_id = %submission.driver_id,
                vehicle_id = %submission.vehicle_id,
                "out-of-order fix logged; projection untouched"
            );
        }

        Ok(SubmitOutcome {
            accepted: true,
            speed_kmh,
            bearing_deg,
            projection_updated: fresh,
        })
    }

    /// Accept a batch of fixes. Each entry goes through the full `submit`
    /// path; entries that fail are skipped, not fatal. A batch where
    /// nothing lands is itself a rejection.
    pub fn submit_batch(
        &self,
        submissions: Vec<FixSubmission>,
        now_minutes: u32,
    ) -> Result<BatchOutcome, AppError> {
        if submissions.is_empty() {
            return Err(AppError::BadRequest(
                "at least one fix is required".to_string(),
            ));
        }

        let total = submissions.len();
        let mut processed = 0;

        for submission in submissions {
            match self.submit(submission, now_minutes) {
                Ok(_) => processed += 1,
                Err(err) => {
                    debug!(error = %err, "batch entry skipped");
                }
            }
        }

        if processed == 0 {
            return Err(AppError::InvalidFix(
                "no valid fixes in batch".to_string(),
            ));
        }

        info!(processed, total, "batch ingested");
        Ok(BatchOutcome { processed, total })
    }

    pub fn latest_position(
        &self,
        driver_id: &str,
        vehicle_id: &str,
    ) -> Result<Option<LatestPosition>, AppError> {
        Ok(self.latest.get(driver_id, vehicle_id)?)
    }

    /// Newest-first slice of the durable fix log.
    pub fn history(&self, driver_id: &str, limit: usize) -> Result<Vec<LocationFix>, AppError> {
        Ok(self.fix_log.history(driver_id, limit)?)
    }

    /// Drivers whose latest position lies within `radius_km` of a point,
    /// nearest first.
    pub fn nearby(&self, center: GeoPoint, radius_km: f64) -> Result<Vec<NearbyDriver>, AppError> {
        if !center.is_valid() {
            return Err(AppError::BadRequest("invalid center coordinates".to_string()));
        }

        let mut drivers: Vec<NearbyDriver> = self
            .latest
            .all()?
            .into_iter()
            .filter_map(|position| {
                let distance_km = geo::distance_meters(&center, &position.position) / 1000.0;
                (distance_km <= radius_km).then(|| NearbyDriver {
                    position,
                    distance_km: round2(distance_km),
                })
            })
            .collect();

        drivers.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(drivers)
    }
}

fn validate(submission: &FixSubmission) -> Result<(), AppError> {
    if submission.driver_id.trim().is_empty() {
        return Err(AppError::InvalidFix("driver id is required".to_string()));
    }
    if submission.vehicle_id.trim().is_empty() {
        return Err(AppError::InvalidFix("vehicle id is required".to_string()));
    }

    let position = GeoPoint {
        lat: submission.lat,
        lng: submission.lng,
    };
    if !position.is_valid() {
        return Err(AppError::InvalidFix(format!(
            "coordinates out of range: ({}, {})",
            submission.lat, submission.lng
        )));
    }

    if !submission.accuracy_m.is_finite() || submission.accuracy_m < 0.0 {
        return Err(AppError::InvalidFix("accuracy must be >= 0".to_string()));
    }

    if let Some(speed) = submission.reported_speed_kmh {
        if !speed.is_finite() || speed < 0.0 {
            return Err(AppError::InvalidFix(
                "reported speed must be >= 0".to_string(),
            ));
        }
    }

    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
