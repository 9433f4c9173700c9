//! Building entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{AlertSettings, Building, BuildingStatus, DeviceCounts};
use sqlx::FromRow;

/// Database row mapping for the buildings table.
#[derive(Debug, Clone, FromRow)]
pub struct BuildingEntity {
    pub id: i64,
    pub name: String,
    pub map_x: f64,
    pub map_y: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BuildingEntity> for Building {
    fn from(entity: BuildingEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            map_x: entity.map_x,
            map_y: entity.map_y,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// A building joined with the summed counts of its networks.
#[derive(Debug, Clone, FromRow)]
pub struct BuildingStatusEntity {
    pub id: i64,
    pub name: String,
    pub map_x: f64,
    pub map_y: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub network_count: i64,
    pub total_devices: i64,
    pub offline_devices: i64,
}

impl BuildingStatusEntity {
    /// Classifies the row under the current alert settings.
    pub fn into_status(self, settings: &AlertSettings) -> BuildingStatus {
        let counts = DeviceCounts::new(self.total_devices, self.offline_devices);
        let network_count = self.network_count;
        let building = Building {
            id: self.id,
            name: self.name,
            map_x: self.map_x,
            map_y: self.map_y,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        BuildingStatus::new(building, network_count, counts, settings)
    }
}
