//! Building domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::alert_settings::{AlertLevel, AlertSettings};
use super::network::{DeviceCounts, NetworkResponse};

/// A campus building, positioned on the dashboard map by percentage offsets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Building {
    pub id: i64,
    pub name: String,
    pub map_x: f64,
    pub map_y: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a building.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBuildingRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(range(min = 0.0, max = 100.0, message = "map_x must be between 0 and 100"))]
    #[serde(default)]
    pub map_x: f64,

    #[validate(range(min = 0.0, max = 100.0, message = "map_y must be between 0 and 100"))]
    #[serde(default)]
    pub map_y: f64,
}

/// Request payload for a partial building update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBuildingRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 0.0, max = 100.0, message = "map_x must be between 0 and 100"))]
    pub map_x: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "map_y must be between 0 and 100"))]
    pub map_y: Option<f64>,
}

/// Building with device totals summed over its networks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BuildingStatus {
    pub id: i64,
    pub name: String,
    pub map_x: f64,
    pub map_y: f64,
    pub network_count: i64,
    pub total_devices: i64,
    pub offline_devices: i64,
    pub offline_percentage: f64,
    pub alert_level: AlertLevel,
}

impl BuildingStatus {
    pub fn new(
        building: Building,
        network_count: i64,
        counts: DeviceCounts,
        settings: &AlertSettings,
    ) -> Self {
        let offline_percentage = counts.offline_percentage();
        Self {
            id: building.id,
            name: building.name,
            map_x: building.map_x,
            map_y: building.map_y,
            network_count,
            total_devices: counts.total,
            offline_devices: counts.offline,
            offline_percentage,
            alert_level: settings.alert_level(offline_percentage),
        }
    }

    pub fn counts(&self) -> DeviceCounts {
        DeviceCounts::new(self.total_devices, self.offline_devices)
    }
}

/// Single building with its networks.
#[derive(Debug, Clone, Serialize)]
pub struct BuildingDetail {
    #[serde(flatten)]
    pub status: BuildingStatus,
    pub networks: Vec<NetworkResponse>,
}
