use serde::Serialize;

use crate::models::location::GeoPoint;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points (haversine).
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().atan2((1.0 - haversine).sqrt());

    EARTH_RADIUS_M * central_angle
}

/// Initial compass bearing from `a` toward `b`, normalized to [0, 360).
/// Coincident points yield 0 rather than NaN.
pub fn bearing_degrees(a: &GeoPoint, b: &GeoPoint) -> f64 {
    if a.lat == b.lat && a.lng == b.lng {
        return 0.0;
    }

    let delta_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

#[derive(Debug, Clone, Serialize)]
pub struct Eta {
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
    pub formatted: String,
}

/// Division-based ETA. `None` when speed is not positive: callers decide
/// how to surface an indeterminate arrival time.
pub fn eta_from_distance_and_speed(distance_m: f64, speed_kmh: f64) -> Option<Eta> {
    if speed_kmh <= 0.0 {
        return None;
    }

    let hours = (distance_m / 1000.0) / speed_kmh;
    let total_minutes = hours * 60.0;
    let minutes = total_minutes.floor();
    let seconds = ((total_minutes - minutes) * 60.0).round();

    let formatted = if minutes > 60.0 {
        let h = (minutes / 60.0).floor();
        let m = minutes % 60.0;
        format!("{h:.0}h {m:.0}m")
    } else if minutes > 0.0 {
        if seconds > 0.0 && minutes < 5.0 {
            format!("{minutes:.0}m {seconds:.0}s")
        } else {
            format!("{minutes:.0}m")
        }
    } else {
        format!("{seconds:.0}s")
    };

    Some(Eta {
        hours,
        minutes: total_minutes,
        seconds: total_minutes * 60.0,
        formatted,
    })
}

/// Hour-of-day traffic factor. Boundaries are total and non-overlapping:
/// 7-10 and 17-20 peak, 11-16 moderate, 22-23 and 0-6 light, 21 normal.
pub fn traffic_factor_for_hour(hour: u32) -> f64 {
    match hour {
        7..=10 | 17..=20 => 0.7,
        11..=16 => 0.9,
        22..=23 | 0..=6 => 1.3,
        _ => 1.0,
    }
}

pub fn traffic_condition(factor: f64) -> &'static str {
    if factor <= 0.7 {
        "Heavy Traffic"
    } else if factor <= 0.9 {
        "Moderate Traffic"
    } else if factor >= 1.2 {
        "Light Traffic"
    } else {
        "Normal Traffic"
    }
}

/// ETA with the time-of-day heuristic applied to the base speed.
pub fn eta_with_traffic(distance_m: f64, base_speed_kmh: f64, hour: u32) -> Option<Eta> {
    let adjusted = base_speed_kmh * traffic_factor_for_hour(hour);
    eta_from_distance_and_speed(distance_m, adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::GeoPoint;

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint {
            lat: 53.5511,
            lng: 9.9937,
        };
        assert!(distance_meters(&p, &p) < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let london = GeoPoint {
            lat: 51.5074,
            lng: -0.1278,
        };
        let paris = GeoPoint {
            lat: 48.8566,
            lng: 2.3522,
        };
        let ab = distance_meters(&london, &paris);
        let ba = distance_meters(&paris, &london);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = GeoPoint {
            lat: 51.5074,
            lng: -0.1278,
        };
        let paris = GeoPoint {
            lat: 48.8566,
            lng: 2.3522,
        };
        let distance = distance_meters(&london, &paris);
        assert!((distance - 343_000.0).abs() < 5_000.0);
    }

    #[test]
    fn bearing_due_east_on_equator() {
        let origin = GeoPoint { lat: 0.0, lng: 0.0 };
        let east = GeoPoint { lat: 0.0, lng: 1.0 };
        let bearing = bearing_degrees(&origin, &east);
        assert!((bearing - 90.0).abs() < 1e-6);
    }

    #[test]
    fn bearing_due_north() {
        let origin = GeoPoint { lat: 0.0, lng: 0.0 };
        let north = GeoPoint { lat: 1.0, lng: 0.0 };
        let bearing = bearing_degrees(&origin, &north);
        assert!(bearing.abs() < 1e-6);
    }

    #[test]
    fn bearing_of_coincident_points_is_zero() {
        let p = GeoPoint {
            lat: 12.0,
            lng: 77.0,
        };
        assert_eq!(bearing_degrees(&p, &p), 0.0);
    }

    #[test]
    fn eta_zero_speed_is_indeterminate() {
        assert!(eta_from_distance_and_speed(1000.0, 0.0).is_none());
        assert!(eta_from_distance_and_speed(1000.0, -5.0).is_none());
    }

    #[test]
    fn eta_formats_hours_and_minutes() {
        // 30.6 km at 30 km/h is 61.2 minutes.
        let eta = eta_from_distance_and_speed(30_600.0, 30.0).unwrap();
        assert_eq!(eta.formatted, "1h 1m");
    }

    #[test]
    fn eta_appends_seconds_under_five_minutes() {
        // 3 minutes 20 seconds at 36 km/h = 2000 m.
        let eta = eta_from_distance_and_speed(2000.0, 36.0).unwrap();
        assert_eq!(eta.formatted, "3m 20s");
    }

    #[test]
    fn eta_seconds_only_under_a_minute() {
        // 45 seconds at 40 km/h = 500 m.
        let eta = eta_from_distance_and_speed(500.0, 40.0).unwrap();
        assert_eq!(eta.formatted, "45s");
    }

    #[test]
    fn traffic_factor_covers_every_hour() {
        for hour in 0..24 {
            let factor = traffic_factor_for_hour(hour);
            assert!(
                [0.7, 0.9, 1.0, 1.3].contains(&factor),
                "hour {hour} -> {factor}"
            );
        }
    }

    #[test]
    fn traffic_factor_boundaries() {
        assert_eq!(traffic_factor_for_hour(7), 0.7);
        assert_eq!(traffic_factor_for_hour(10), 0.7);
        assert_eq!(traffic_factor_for_hour(11), 0.9);
        assert_eq!(traffic_factor_for_hour(16), 0.9);
        assert_eq!(traffic_factor_for_hour(17), 0.7);
        assert_eq!(traffic_factor_for_hour(20), 0.7);
        assert_eq!(traffic_factor_for_hour(21), 1.0);
        assert_eq!(traffic_factor_for_hour(22), 1.3);
        assert_eq!(traffic_factor_for_hour(6), 1.3);
    }

    #[test]
    fn peak_hour_slows_the_eta() {
        let free = eta_with_traffic(10_000.0, 40.0, 21).unwrap();
        let peak = eta_with_traffic(10_000.0, 40.0, 8).unwrap();
        assert!(peak.minutes > free.minutes);
    }
}
