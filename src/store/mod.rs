pub mod memory;

use thiserror::Error;
use uuid::Uuid;

use crate::models::assignment::Assignment;
use crate::models::location::{LatestPosition, LocationFix};
use crate::models::sos::SosAlert;

/// Store-level failures. `Unavailable` is transient and safe to retry
/// by the caller; `InvariantViolated` means the backing data is broken.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store invariant violated: {0}")]
    InvariantViolated(String),
}

/// Durable assignment records. Assignments are provisioned externally;
/// this core only reads them.
pub trait AssignmentStore: Send + Sync {
    fn put(&self, assignment: Assignment) -> Result<(), StoreError>;

    /// The single active assignment for a driver. More than one active
    /// match is an invariant violation, never an arbitrary pick.
    fn active_for_driver(&self, driver_id: &str) -> Result<Option<Assignment>, StoreError>;
}

/// Append-only durable log of accepted fixes, per driver.
pub trait FixLogStore: Send + Sync {
    fn append(&self, fix: LocationFix) -> Result<(), StoreError>;

    /// Most recent fixes first.
    fn history(&self, driver_id: &str, limit: usize) -> Result<Vec<LocationFix>, StoreError>;
}

/// Real-time projection: zero or one record per (driver, vehicle) pair.
pub trait LatestPositionStore: Send + Sync {
    fn get(&self, driver_id: &str, vehicle_id: &str)
    -> Result<Option<LatestPosition>, StoreError>;

    fn upsert(&self, position: LatestPosition) -> Result<(), StoreError>;

    fn all(&self) -> Result<Vec<LatestPosition>, StoreError>;
}

/// Durable SOS alert records, retained forever.
pub trait SosAlertStore: Send + Sync {
    fn insert(&self, alert: SosAlert) -> Result<(), StoreError>;

    fn get(&self, id: Uuid) -> Result<Option<SosAlert>, StoreError>;

    fn update(&self, alert: SosAlert) -> Result<(), StoreError>;

    fn active_for_driver(&self, driver_id: &str) -> Result<Vec<SosAlert>, StoreError>;

    fn all_active(&self) -> Result<Vec<SosAlert>, StoreError>;

    /// Unsorted; the service owns the newest-first ordering and the limit.
    fn history(&self, driver_id: Option<&str>) -> Result<Vec<SosAlert>, StoreError>;
}

/// Real-time set of unresolved alerts, keyed by alert id. Exists purely
/// for low-latency fan-out; the durable record is authoritative.
pub trait ActiveAlertStore: Send + Sync {
    fn set(&self, alert: SosAlert) -> Result<(), StoreError>;

    fn remove(&self, id: Uuid) -> Result<(), StoreError>;

    fn all(&self) -> Result<Vec<SosAlert>, StoreError>;
}
