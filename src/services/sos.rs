use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::models::sos::{DEFAULT_SOS_MESSAGE, MAX_SOS_MESSAGE_LEN, SosAlert, SosStatus};
use crate::store::{ActiveAlertStore, SosAlertStore};

/// Emergency alert lifecycle across the durable record store and the
/// real-time active set. The two writes are not transactional; the
/// durable record is authoritative and the active set is best-effort
/// fan-out state.
pub struct SosAlertService {
    alerts: Arc<dyn SosAlertStore>,
    active: Arc<dyn ActiveAlertStore>,
    events_tx: broadcast::Sender<SosAlert>,
}

impl SosAlertService {
    pub fn new(
        alerts: Arc<dyn SosAlertStore>,
        active: Arc<dyn ActiveAlertStore>,
        events_tx: broadcast::Sender<SosAlert>,
    ) -> Self {
        Self {
            alerts,
            active,
            events_tx,
        }
    }

    pub fn raise(
        &self,
        driver_id: &str,
        vehicle_id: &str,
        position: GeoPoint,
        message: Option<String>,
    ) -> Result<SosAlert, AppError> {
        if driver_id.trim().is_empty() || vehicle_id.trim().is_empty() {
            return Err(AppError::InvalidFix(
                "driver id and vehicle id are required".to_string(),
            ));
        }
        if !position.is_valid() {
            return Err(AppError::InvalidFix(format!(
                "coordinates out of range: ({}, {})",
                position.lat, position.lng
            )));
        }

        let message = match message.map(|m| m.trim().to_string()) {
            Some(m) if !m.is_empty() => m.chars().take(MAX_SOS_MESSAGE_LEN).collect(),
            _ => DEFAULT_SOS_MESSAGE.to_string(),
        };

        let alert = SosAlert {
            id: Uuid::new_v4(),
            driver_id: driver_id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            position,
            message,
            status: SosStatus::Active,
            created_at: Utc::now(),
            resolved_at: None,
        };

        // Durable record first, then the fan-out set.
        self.alerts.insert(alert.clone())?;
        self.active.set(alert.clone())?;

        if self.events_tx.send(alert.clone()).is_err() {
            warn!(alert_id = %alert.id, "no observers subscribed for sos alert");
        }

        info!(
            alert_id = %alert.id,
            driver_id = %alert.driver_id,
            vehicle_id = %alert.vehicle_id,
            "sos alert raised"
        );

        Ok(alert)
    }

    /// Single active -> resolved transition. A second resolve is an error,
    /// never a no-op.
    pub fn resolve(&self, alert_id: Uuid) -> Result<SosAlert, AppError> {
        let mut alert = self
            .alerts
            .get(alert_id)?
            .ok_or(AppError::AlertNotFound(alert_id))?;

        if alert.status == SosStatus::Resolved {
            return Err(AppError::AlertAlreadyResolved(alert_id));
        }

        alert.status = SosStatus::Resolved;
        alert.resolved_at = Some(Utc::now());

        self.alerts.update(alert.clone())?;
        self.active.remove(alert_id)?;

        info!(alert_id = %alert_id, "sos alert resolved");
        Ok(alert)
    }

    pub fn list_active_for_driver(&self, driver_id: &str) -> Result<Vec<SosAlert>, AppError> {
        let mut alerts = self.alerts.active_for_driver(driver_id)?;
        sort_newest_first(&mut alerts);
        Ok(alerts)
    }

    pub fn list_all_active(&self) -> Result<Vec<SosAlert>, AppError> {
        let mut alerts = self.alerts.all_active()?;
        sort_newest_first(&mut alerts);
        Ok(alerts)
    }

    pub fn history(
        &self,
        driver_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SosAlert>, AppError> {
        let mut alerts = self.alerts.history(driver_id)?;
        sort_newest_first(&mut alerts);
        alerts.truncate(limit);
        Ok(alerts)
    }
}

/// Newest first, regardless of the backing store's native ordering.
fn sort_newest_first(alerts: &mut [SosAlert]) {
    alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
