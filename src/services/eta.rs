use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::geo::{self, Eta};
use crate::models::location::GeoPoint;
use crate::store::LatestPositionStore;

pub const DEFAULT_SPEED_KMH: f64 = 40.0;

#[derive(Debug, Clone, Serialize)]
pub struct Distance {
    pub meters: f64,
    pub kilometers: f64,
}

impl Distance {
    fn from_meters(meters: f64) -> Self {
        Self {
            meters: meters.round(),
            kilometers: round2(meters / 1000.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PointToPointEta {
    pub distance: Distance,
    pub eta: Eta,
    pub speed_kmh: f64,
    pub traffic_factor: f64,
    pub traffic_condition: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteSegment {
    pub from: String,
    pub to: String,
    pub distance: Distance,
    pub eta: Eta,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteEta {
    pub segments: Vec<RouteSegment>,
    pub total_distance: Distance,
    pub total_eta: Eta,
    pub speed_kmh: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveEta {
    pub driver_id: String,
    pub vehicle_id: String,
    pub current: GeoPoint,
    pub destination: GeoPoint,
    pub distance: Distance,
    pub eta: Eta,
}

/// Thin façade over the geo math and the latest-position read path.
pub struct EtaQueryService {
    latest: Arc<dyn LatestPositionStore>,
}

impl EtaQueryService {
    pub fn new(latest: Arc<dyn LatestPositionStore>) -> Self {
        Self { latest }
    }

    pub fn point_to_point(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        base_speed_kmh: f64,
        hour: u32,
    ) -> Result<PointToPointEta, AppError> {
        validate_endpoints(&[from, to], base_speed_kmh)?;

        let meters = geo::distance_meters(&from, &to);
        let factor = geo::traffic_factor_for_hour(hour);
        let eta = geo::eta_with_traffic(meters, base_speed_kmh, hour)
            .ok_or_else(|| AppError::BadRequest("speed must be > 0".to_string()))?;

        Ok(PointToPointEta {
            distance: Distance::from_meters(meters),
            eta,
            speed_kmh: base_speed_kmh,
            traffic_factor: factor,
            traffic_condition: geo::traffic_condition(factor),
        })
    }

    /// Per-segment ETAs for consecutive waypoint pairs. The whole request
    /// is evaluated at one hour for determinism, and the total ETA comes
    /// from the summed distance rather than summed segment ETAs.
    pub fn route_waypoints(
        &self,
        waypoints: &[Waypoint],
        base_speed_kmh: f64,
        hour: u32,
    ) -> Result<RouteEta, AppError> {
        if waypoints.len() < 2 {
            return Err(AppError::BadRequest(
                "at least 2 waypoints are required".to_string(),
            ));
        }
        let points: Vec<GeoPoint> = waypoints
            .iter()
            .map(|w| GeoPoint {
                lat: w.lat,
                lng: w.lng,
            })
            .collect();
        validate_endpoints(&points, base_speed_kmh)?;

        let mut total_meters = 0.0;
        let mut segments = Vec::with_capacity(waypoints.len() - 1);

        for (i, pair) in points.windows(2).enumerate() {
            let meters = geo::distance_meters(&pair[0], &pair[1]);
            total_meters += meters;

            let eta = geo::eta_with_traffic(meters, base_speed_kmh, hour)
                .ok_or_else(|| AppError::BadRequest("speed must be > 0".to_string()))?;

            segments.push(RouteSegment {
                from: waypoint_label(&waypoints[i], i),
                to: waypoint_label(&waypoints[i + 1], i + 1),
                distance: Distance::from_meters(meters),
                eta,
            });
        }

        let total_eta = geo::eta_with_traffic(total_meters, base_speed_kmh, hour)
            .ok_or_else(|| AppError::BadRequest("speed must be > 0".to_string()))?;

        Ok(RouteEta {
            segments,
            total_distance: Distance::from_meters(total_meters),
            total_eta,
            speed_kmh: base_speed_kmh,
        })
    }

    pub fn live_to_destination(
        &self,
        driver_id: &str,
        vehicle_id: &str,
        destination: GeoPoint,
        base_speed_kmh: f64,
        hour: u32,
    ) -> Result<LiveEta, AppError> {
        validate_endpoints(&[destination], base_speed_kmh)?;

        let current = self
            .latest
            .get(driver_id, vehicle_id)?
            .ok_or_else(|| AppError::DriverLocationUnavailable(driver_id.to_string()))?;

        let meters = geo::distance_meters(&current.position, &destination);
        let eta = geo::eta_with_traffic(meters, base_speed_kmh, hour)
            .ok_or_else(|| AppError::BadRequest("speed must be > 0".to_string()))?;

        Ok(LiveEta {
            driver_id: driver_id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            current: current.position,
            destination,
            distance: Distance::from_meters(meters),
            eta,
        })
    }
}

fn waypoint_label(waypoint: &Waypoint, index: usize) -> String {
    waypoint
        .name
        .clone()
        .unwrap_or_else(|| format!("Point {}", index + 1))
}

fn validate_endpoints(points: &[GeoPoint], base_speed_kmh: f64) -> Result<(), AppError> {
    if base_speed_kmh <= 0.0 || !base_speed_kmh.is_finite() {
        return Err(AppError::BadRequest("speed must be > 0".to_string()));
    }
    for point in points {
        if !point.is_valid() {
            return Err(AppError::BadRequest(format!(
                "coordinates out of range: ({}, {})",
                point.lat, point.lng
            )));
        }
    }
    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
