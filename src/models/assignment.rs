use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AssignmentStatus {
    Active,
    Inactive,
    Completed,
}

/// Links one driver to one vehicle for one recurring daily shift.
/// Created by external provisioning; read-only from this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub driver_id: String,
    pub vehicle_id: String,
    pub route_id: Option<String>,
    /// Wall-clock shift start, "HH:MM". No date component: the shift
    /// recurs daily.
    pub start_time: Option<String>,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// Shift start as minutes since local midnight. `None` when the start
    /// time is missing or not "HH:MM".
    pub fn start_minutes(&self) -> Option<u32> {
        let raw = self.start_time.as_deref()?;
        let (hour, minute) = raw.split_once(':')?;
        let hour: u32 = hour.parse().ok()?;
        let minute: u32 = minute.parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(hour * 60 + minute)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{Assignment, AssignmentStatus};

    fn assignment(start_time: Option<&str>) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            driver_id: "driver-1".to_string(),
            vehicle_id: "bus-42".to_string(),
            route_id: None,
            start_time: start_time.map(str::to_string),
            status: AssignmentStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn start_minutes_parses_hh_mm() {
        assert_eq!(assignment(Some("08:00")).start_minutes(), Some(480));
        assert_eq!(assignment(Some("23:30")).start_minutes(), Some(1410));
        assert_eq!(assignment(Some("00:00")).start_minutes(), Some(0));
    }

    #[test]
    fn start_minutes_rejects_garbage() {
        assert_eq!(assignment(None).start_minutes(), None);
        assert_eq!(assignment(Some("24:00")).start_minutes(), None);
        assert_eq!(assignment(Some("8am")).start_minutes(), None);
        assert_eq!(assignment(Some("12:61")).start_minutes(), None);
    }
}
