//! Device entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Device, DeviceStatus};
use sqlx::FromRow;

/// Database row mapping for the devices table.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceEntity {
    pub id: i64,
    pub mac_address: String,
    pub ip_address: String,
    pub network_id: i64,
    pub status: String,
    pub is_critical: bool,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeviceEntity> for Device {
    fn from(entity: DeviceEntity) -> Self {
        Self {
            id: entity.id,
            mac_address: entity.mac_address,
            ip_address: entity.ip_address,
            network_id: entity.network_id,
            // The column is constrained to 'online' / 'offline'.
            status: entity.status.parse().unwrap_or(DeviceStatus::Offline),
            is_critical: entity.is_critical,
            owner: entity.owner,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
