//! Network entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{DeviceCounts, Network};
use sqlx::FromRow;

/// Database row mapping for the networks table.
#[derive(Debug, Clone, FromRow)]
pub struct NetworkEntity {
    pub id: i64,
    pub subnet: String,
    pub total_devices: i32,
    pub offline_devices: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NetworkEntity> for Network {
    fn from(entity: NetworkEntity) -> Self {
        Self {
            id: entity.id,
            subnet: entity.subnet,
            total_devices: entity.total_devices,
            offline_devices: entity.offline_devices,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Campus-wide sum of the cached network counts.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct CampusCountsEntity {
    pub total_devices: i64,
    pub offline_devices: i64,
}

impl From<CampusCountsEntity> for DeviceCounts {
    fn from(entity: CampusCountsEntity) -> Self {
        DeviceCounts::new(entity.total_devices, entity.offline_devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_entity_to_domain() {
        let entity = NetworkEntity {
            id: 7,
            subnet: "10.20.0.0/24".to_string(),
            total_devices: 40,
            offline_devices: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let network: Network = entity.into();
        assert_eq!(network.subnet, "10.20.0.0/24");
        assert_eq!(network.counts(), DeviceCounts::new(40, 10));
    }

    #[test]
    fn test_campus_counts() {
        let counts: DeviceCounts = CampusCountsEntity {
            total_devices: 120,
            offline_devices: 30,
        }
        .into();
        assert_eq!(counts.offline_percentage(), 25.0);
    }
}
