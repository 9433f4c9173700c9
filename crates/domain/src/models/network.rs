//! Network domain model and device-count aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::alert_settings::{AlertLevel, AlertSettings};

/// A monitored subnet.
///
/// `total_devices` and `offline_devices` are derived values. They are only
/// as fresh as the last recount of this network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Network {
    pub id: i64,
    pub subnet: String,
    pub total_devices: i32,
    pub offline_devices: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Network {
    pub fn counts(&self) -> DeviceCounts {
        DeviceCounts::new(i64::from(self.total_devices), i64::from(self.offline_devices))
    }
}

/// Total and offline device counts for a network, a building, or the campus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeviceCounts {
    pub total: i64,
    pub offline: i64,
}

impl DeviceCounts {
    pub fn new(total: i64, offline: i64) -> Self {
        Self { total, offline }
    }

    pub fn online(&self) -> i64 {
        (self.total - self.offline).max(0)
    }

    /// `offline / total * 100`, or 0 for an empty set.
    pub fn offline_percentage(&self) -> f64 {
        if self.total <= 0 {
            return 0.0;
        }
        self.offline as f64 / self.total as f64 * 100.0
    }

    /// Sums two sets of counts.
    pub fn merge(self, other: DeviceCounts) -> DeviceCounts {
        DeviceCounts {
            total: self.total + other.total,
            offline: self.offline + other.offline,
        }
    }
}

impl std::iter::Sum for DeviceCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(DeviceCounts::default(), DeviceCounts::merge)
    }
}

/// Request payload for creating a network.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNetworkRequest {
    #[validate(custom(function = "shared::validation::validate_subnet"))]
    pub subnet: String,
}

/// Request payload for changing a network's subnet.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateNetworkRequest {
    #[validate(custom(function = "shared::validation::validate_subnet"))]
    pub subnet: String,
}

/// Network as returned to dashboard clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NetworkResponse {
    pub id: i64,
    pub subnet: String,
    pub total_devices: i32,
    pub offline_devices: i32,
    pub online_devices: i64,
    pub offline_percentage: f64,
    pub alert_level: AlertLevel,
    pub updated_at: DateTime<Utc>,
}

impl NetworkResponse {
    pub fn new(network: Network, settings: &AlertSettings) -> Self {
        let counts = network.counts();
        let offline_percentage = counts.offline_percentage();
        Self {
            id: network.id,
            subnet: network.subnet,
            total_devices: network.total_devices,
            offline_devices: network.offline_devices,
            online_devices: counts.online(),
            offline_percentage,
            alert_level: settings.alert_level(offline_percentage),
            updated_at: network.updated_at,
        }
    }
}

/// Response payload for a recount.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RecountResponse {
    pub network_id: i64,
    pub total_devices: i64,
    pub offline_devices: i64,
}
