use std::sync::Arc;

use tokio::sync::broadcast;

use crate::models::sos::SosAlert;
use crate::observability::metrics::Metrics;
use crate::services::eta::EtaQueryService;
use crate::services::ingest::LocationIngestService;
use crate::services::sos::SosAlertService;
use crate::store::memory::{
    MemoryActiveAlertSet, MemoryAssignmentStore, MemoryFixLog, MemoryLatestPositionStore,
    MemorySosAlertStore,
};
use crate::store::{
    ActiveAlertStore, AssignmentStore, FixLogStore, LatestPositionStore, SosAlertStore,
};

/// Composition root: store handles, the services wired over them, the SOS
/// fan-out channel, and the metrics registry. Services receive their store
/// dependencies explicitly; nothing here is a process-global.
pub struct AppState {
    pub assignments: Arc<dyn AssignmentStore>,
    pub fix_log: Arc<dyn FixLogStore>,
    pub latest_positions: Arc<dyn LatestPositionStore>,
    pub sos_alerts: Arc<dyn SosAlertStore>,
    pub active_alerts: Arc<dyn ActiveAlertStore>,
    pub ingest: LocationIngestService,
    pub eta: EtaQueryService,
    pub sos: SosAlertService,
    pub sos_events_tx: broadcast::Sender<SosAlert>,
    pub default_speed_kmh: f64,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize, default_speed_kmh: f64) -> Self {
        let assignments: Arc<dyn AssignmentStore> = Arc::new(MemoryAssignmentStore::new());
        let fix_log: Arc<dyn FixLogStore> = Arc::new(MemoryFixLog::new());
        let latest_positions: Arc<dyn LatestPositionStore> =
            Arc::new(MemoryLatestPositionStore::new());
        let sos_alerts: Arc<dyn SosAlertStore> = Arc::new(MemorySosAlertStore::new());
        let active_alerts: Arc<dyn ActiveAlertStore> = Arc::new(MemoryActiveAlertSet::new());

        let (sos_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            ingest: LocationIngestService::new(
                assignments.clone(),
                fix_log.clone(),
                latest_positions.clone(),
            ),
            eta: EtaQueryService::new(latest_positions.clone()),
            sos: SosAlertService::new(
                sos_alerts.clone(),
                active_alerts.clone(),
                sos_events_tx.clone(),
            ),
            assignments,
            fix_log,
            latest_positions,
            sos_alerts,
            active_alerts,
            sos_events_tx,
            default_speed_kmh,
            metrics: Metrics::new(),
        }
    }
}
