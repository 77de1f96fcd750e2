use dashmap::DashMap;
use uuid::Uuid;

use crate::models::assignment::{Assignment, AssignmentStatus};
use crate::models::location::{LatestPosition, LocationFix};
use crate::models::sos::{SosAlert, SosStatus};
use crate::store::{
    ActiveAlertStore, AssignmentStore, FixLogStore, LatestPositionStore, SosAlertStore, StoreError,
};

#[derive(Default)]
pub struct MemoryAssignmentStore {
    assignments: DashMap<Uuid, Assignment>,
}

impl MemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssignmentStore for MemoryAssignmentStore {
    fn put(&self, assignment: Assignment) -> Result<(), StoreError> {
        self.assignments.insert(assignment.id, assignment);
        Ok(())
    }

    fn active_for_driver(&self, driver_id: &str) -> Result<Option<Assignment>, StoreError> {
        let mut matches: Vec<Assignment> = self
            .assignments
            .iter()
            .filter(|entry| {
                entry.driver_id == driver_id && entry.status == AssignmentStatus::Active
            })
            .map(|entry| entry.value().clone())
            .collect();

        if matches.len() > 1 {
            return Err(StoreError::InvariantViolated(format!(
                "driver {driver_id} has {} active assignments",
                matches.len()
            )));
        }

        Ok(matches.pop())
    }
}

#[derive(Default)]
pub struct MemoryFixLog {
    fixes: DashMap<String, Vec<LocationFix>>,
}

impl MemoryFixLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FixLogStore for MemoryFixLog {
    fn append(&self, fix: LocationFix) -> Result<(), StoreError> {
        self.fixes
            .entry(fix.driver_id.clone())
            .or_default()
            .push(fix);
        Ok(())
    }

    fn history(&self, driver_id: &str, limit: usize) -> Result<Vec<LocationFix>, StoreError> {
        let fixes = match self.fixes.get(driver_id) {
            Some(entry) => entry.iter().rev().take(limit).cloned().collect(),
            None => Vec::new(),
        };
        Ok(fixes)
    }
}

#[derive(Default)]
pub struct MemoryLatestPositionStore {
    positions: DashMap<(String, String), LatestPosition>,
}

impl MemoryLatestPositionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LatestPositionStore for MemoryLatestPositionStore {
    fn get(
        &self,
        driver_id: &str,
        vehicle_id: &str,
    ) -> Result<Option<LatestPosition>, StoreError> {
        let key = (driver_id.to_string(), vehicle_id.to_string());
        Ok(self.positions.get(&key).map(|entry| entry.value().clone()))
    }

    fn upsert(&self, position: LatestPosition) -> Result<(), StoreError> {
        let key = (position.driver_id.clone(), position.vehicle_id.clone());
        self.positions.insert(key, position);
        Ok(())
    }

    fn all(&self) -> Result<Vec<LatestPosition>, StoreError> {
        Ok(self
            .positions
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[derive(Default)]
pub struct MemorySosAlertStore {
    alerts: DashMap<Uuid, SosAlert>,
}

impl MemorySosAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SosAlertStore for MemorySosAlertStore {
    fn insert(&self, alert: SosAlert) -> Result<(), StoreError> {
        self.alerts.insert(alert.id, alert);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<SosAlert>, StoreError> {
        Ok(self.alerts.get(&id).map(|entry| entry.value().clone()))
    }

    fn update(&self, alert: SosAlert) -> Result<(), StoreError> {
        self.alerts.insert(alert.id, alert);
        Ok(())
    }

    fn active_for_driver(&self, driver_id: &str) -> Result<Vec<SosAlert>, StoreError> {
        Ok(self
            .alerts
            .iter()
            .filter(|entry| entry.driver_id == driver_id && entry.status == SosStatus::Active)
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn all_active(&self) -> Result<Vec<SosAlert>, StoreError> {
        Ok(self
            .alerts
            .iter()
            .filter(|entry| entry.status == SosStatus::Active)
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn history(&self, driver_id: Option<&str>) -> Result<Vec<SosAlert>, StoreError> {
        Ok(self
            .alerts
            .iter()
            .filter(|entry| driver_id.is_none_or(|id| entry.driver_id == id))
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryActiveAlertSet {
    alerts: DashMap<Uuid, SosAlert>,
}

impl MemoryActiveAlertSet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActiveAlertStore for MemoryActiveAlertSet {
    fn set(&self, alert: SosAlert) -> Result<(), StoreError> {
        self.alerts.insert(alert.id, alert);
        Ok(())
    }

    fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        self.alerts.remove(&id);
        Ok(())
    }

    fn all(&self) -> Result<Vec<SosAlert>, StoreError> {
        Ok(self
            .alerts
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::assignment::{Assignment, AssignmentStatus};

    fn assignment(driver_id: &str, status: AssignmentStatus) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            driver_id: driver_id.to_string(),
            vehicle_id: "bus-1".to_string(),
            route_id: None,
            start_time: Some("08:00".to_string()),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn active_lookup_ignores_inactive_assignments() {
        let store = MemoryAssignmentStore::new();
        store
            .put(assignment("driver-1", AssignmentStatus::Completed))
            .unwrap();
        store
            .put(assignment("driver-1", AssignmentStatus::Active))
            .unwrap();
        store
            .put(assignment("driver-2", AssignmentStatus::Active))
            .unwrap();

        let found = store.active_for_driver("driver-1").unwrap().unwrap();
        assert_eq!(found.driver_id, "driver-1");
        assert_eq!(found.status, AssignmentStatus::Active);
    }

    #[test]
    fn two_active_assignments_is_an_invariant_violation() {
        let store = MemoryAssignmentStore::new();
        store
            .put(assignment("driver-1", AssignmentStatus::Active))
            .unwrap();
        store
            .put(assignment("driver-1", AssignmentStatus::Active))
            .unwrap();

        assert!(matches!(
            store.active_for_driver("driver-1"),
            Err(StoreError::InvariantViolated(_))
        ));
    }

    #[test]
    fn fix_log_history_is_newest_first() {
        use crate::models::location::{GeoPoint, LocationFix};

        let log = MemoryFixLog::new();
        for i in 0..3 {
            log.append(LocationFix {
                driver_id: "driver-1".to_string(),
                vehicle_id: "bus-1".to_string(),
                assignment_id: Uuid::new_v4(),
                position: GeoPoint {
                    lat: i as f64,
                    lng: 0.0,
                },
                accuracy_m: 5.0,
                reported_speed_kmh: None,
                captured_at: Utc::now(),
            })
            .unwrap();
        }

        let history = log.history("driver-1", 2).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].position.lat, 2.0);
        assert_eq!(history[1].position.lat, 1.0);
    }
}
