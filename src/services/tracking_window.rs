//! Temporal gate over an assignment's 60-minute tracking window.
//!
//! Pure functions of one assignment and one instant, expressed as
//! minutes since local midnight. Assignment selection lives in the
//! store layer, never here.

use chrono::{Local, Timelike};
use serde::Serialize;

use crate::models::assignment::Assignment;

pub const WINDOW_MINUTES: u32 = 60;
const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Serialize)]
pub struct WindowDecision {
    pub allowed: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_until_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_after_end: Option<String>,
}

impl WindowDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: "Within tracking window".to_string(),
            time_until_start: None,
            time_after_end: None,
        }
    }

    fn deny(reason: String) -> Self {
        Self {
            allowed: false,
            reason,
            time_until_start: None,
            time_after_end: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackingWindow {
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
}

/// Current local wall clock reduced to minutes since midnight.
pub fn local_now_minutes() -> u32 {
    let now = Local::now().time();
    now.hour() * 60 + now.minute()
}

/// Decide whether location submission is authorized at `now_minutes`.
/// The window is `[start, start + 60]`, inclusive of both ends, and
/// wraps past midnight when the shift starts late enough.
pub fn is_allowed(assignment: &Assignment, now_minutes: u32) -> WindowDecision {
    let Some(start_raw) = assignment.start_time.as_deref() else {
        return WindowDecision::deny("No start time defined".to_string());
    };

    let Some(start) = assignment.start_minutes() else {
        return WindowDecision::deny(format!("Invalid start time format: {start_raw}"));
    };

    let end = start + WINDOW_MINUTES;

    if end >= MINUTES_PER_DAY {
        let wrapped_end = end - MINUTES_PER_DAY;
        if now_minutes >= start || now_minutes <= wrapped_end {
            return WindowDecision::allow();
        }
    } else if (start..=end).contains(&now_minutes) {
        return WindowDecision::allow();
    }

    let until_start = start as i64 - now_minutes as i64;
    if until_start > 0 {
        let wait = format_h_m(until_start as u32);
        WindowDecision {
            allowed: false,
            reason: format!("Tracking starts at {start_raw}. Please wait {wait}"),
            time_until_start: Some(wait),
            time_after_end: None,
        }
    } else {
        let after = format_h_m(now_minutes - end);
        WindowDecision {
            allowed: false,
            reason: format!(
                "Tracking window ended at {:02}:{:02}. You missed it by {after}",
                end / 60,
                end % 60
            ),
            time_until_start: None,
            time_after_end: Some(after),
        }
    }
}

/// Formatted window for the "can I start tracking yet?" status query.
/// The end hour is displayed modulo 24, independent of the wrap logic.
pub fn tracking_window(assignment: &Assignment) -> Option<TrackingWindow> {
    let start = assignment.start_minutes()?;
    let end_hour = (start / 60 + 1) % 24;

    Some(TrackingWindow {
        start_time: format!("{:02}:{:02}", start / 60, start % 60),
        end_time: format!("{:02}:{:02}", end_hour, start % 60),
        duration: "1 hour".to_string(),
    })
}

fn format_h_m(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::assignment::AssignmentStatus;

    fn assignment(start_time: Option<&str>) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            driver_id: "driver-1".to_string(),
            vehicle_id: "bus-42".to_string(),
            route_id: Some("route-9".to_string()),
            start_time: start_time.map(str::to_string),
            status: AssignmentStatus::Active,
            created_at: Utc::now(),
        }
    }

    fn minutes(h: u32, m: u32) -> u32 {
        h * 60 + m
    }

    #[test]
    fn window_is_inclusive_at_both_ends() {
        let a = assignment(Some("08:00"));

        assert!(is_allowed(&a, minutes(8, 0)).allowed);
        assert!(is_allowed(&a, minutes(8, 30)).allowed);
        assert!(is_allowed(&a, minutes(9, 0)).allowed);
    }

    #[test]
    fn one_minute_late_is_denied_with_elapsed_time() {
        let a = assignment(Some("08:00"));

        let decision = is_allowed(&a, minutes(9, 1));
        assert!(!decision.allowed);
        assert_eq!(decision.time_after_end.as_deref(), Some("0h 1m"));
        assert_eq!(
            decision.reason,
            "Tracking window ended at 09:00. You missed it by 0h 1m"
        );
    }

    #[test]
    fn one_minute_early_is_denied_with_wait_time() {
        let a = assignment(Some("08:00"));

        let decision = is_allowed(&a, minutes(7, 59));
        assert!(!decision.allowed);
        assert_eq!(decision.time_until_start.as_deref(), Some("0h 1m"));
        assert_eq!(
            decision.reason,
            "Tracking starts at 08:00. Please wait 0h 1m"
        );
    }

    #[test]
    fn long_wait_is_formatted_in_hours() {
        let a = assignment(Some("20:00"));

        let decision = is_allowed(&a, minutes(17, 45));
        assert!(!decision.allowed);
        assert_eq!(decision.time_until_start.as_deref(), Some("2h 15m"));
    }

    #[test]
    fn window_wraps_past_midnight() {
        let a = assignment(Some("23:30"));

        assert!(is_allowed(&a, minutes(23, 45)).allowed);
        assert!(is_allowed(&a, minutes(0, 15)).allowed);
        assert!(!is_allowed(&a, minutes(1, 0)).allowed);
    }

    #[test]
    fn missing_start_time_is_a_hard_rejection() {
        let a = assignment(None);

        let decision = is_allowed(&a, minutes(12, 0));
        assert!(!decision.allowed);
        assert_eq!(decision.reason, "No start time defined");
    }

    #[test]
    fn malformed_start_time_is_denied() {
        let a = assignment(Some("noonish"));

        let decision = is_allowed(&a, minutes(12, 0));
        assert!(!decision.allowed);
        assert!(decision.reason.starts_with("Invalid start time format"));
    }

    #[test]
    fn formatted_window_wraps_end_hour_display() {
        let a = assignment(Some("23:30"));

        let window = tracking_window(&a).unwrap();
        assert_eq!(window.start_time, "23:30");
        assert_eq!(window.end_time, "00:30");
        assert_eq!(window.duration, "1 hour");
    }

    #[test]
    fn formatted_window_requires_a_start_time() {
        assert!(tracking_window(&assignment(None)).is_none());
    }
}
