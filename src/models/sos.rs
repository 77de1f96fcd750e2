use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::location::GeoPoint;

pub const DEFAULT_SOS_MESSAGE: &str = "Emergency SOS Alert from Driver";
pub const MAX_SOS_MESSAGE_LEN: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SosStatus {
    Active,
    Resolved,
}

/// One emergency signal raised by a driver. Transitions
/// active -> resolved exactly once; the durable record is kept forever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SosAlert {
    pub id: Uuid,
    pub driver_id: String,
    pub vehicle_id: String,
    pub position: GeoPoint,
    pub message: String,
    pub status: SosStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}
