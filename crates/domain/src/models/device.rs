//! Device (IP phone) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use super::device_activity::{SAMPLE_OFFLINE, SAMPLE_ONLINE};
use super::extension::Extension;

/// Reachability of a device as last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
        }
    }

    /// Code written into the daily activity sample array.
    pub fn sample_code(&self) -> i32 {
        match self {
            DeviceStatus::Online => SAMPLE_ONLINE,
            DeviceStatus::Offline => SAMPLE_OFFLINE,
        }
    }
}

impl FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(DeviceStatus::Online),
            "offline" => Ok(DeviceStatus::Offline),
            _ => Err(format!("Unknown device status: {}", s)),
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitored device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Device {
    pub id: i64,
    pub mac_address: String,
    pub ip_address: String,
    pub network_id: i64,
    pub status: DeviceStatus,
    pub is_critical: bool,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a device.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDeviceRequest {
    #[validate(custom(function = "shared::validation::validate_mac_address"))]
    pub mac_address: String,

    #[validate(custom(function = "shared::validation::validate_ip_address"))]
    pub ip_address: String,

    pub network_id: i64,

    #[serde(default = "default_status")]
    pub status: DeviceStatus,

    #[serde(default)]
    pub is_critical: bool,

    #[validate(length(max = 255, message = "Owner must be at most 255 characters"))]
    pub owner: Option<String>,
}

/// Request payload for a partial device update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDeviceRequest {
    #[validate(custom(function = "shared::validation::validate_mac_address"))]
    pub mac_address: Option<String>,

    #[validate(custom(function = "shared::validation::validate_ip_address"))]
    pub ip_address: Option<String>,

    pub network_id: Option<i64>,

    pub is_critical: Option<bool>,

    #[validate(length(max = 255, message = "Owner must be at most 255 characters"))]
    pub owner: Option<String>,
}

/// Request payload for a single status change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: DeviceStatus,
}

/// One entry of a bulk status sync, keyed by IP address.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatusSyncItem {
    #[validate(custom(function = "shared::validation::validate_ip_address"))]
    pub ip_address: String,
    pub status: DeviceStatus,
}

/// Bulk status update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusSyncRequest {
    #[validate(length(min = 1, max = 5000, message = "Between 1 and 5000 updates are allowed"))]
    #[validate(nested)]
    pub updates: Vec<StatusSyncItem>,
}

/// Outcome of a bulk status update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusSyncResponse {
    pub updated: u64,
    pub unknown_ip_addresses: Vec<String>,
    pub networks_recounted: usize,
}

/// Listing filters (`/devices?network_id=3&status=offline`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDevicesQuery {
    pub network_id: Option<i64>,
    pub status: Option<DeviceStatus>,
    pub is_critical: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// One page of devices.
#[derive(Debug, Clone, Serialize)]
pub struct ListDevicesResponse {
    pub devices: Vec<Device>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// Single device with its registered extensions.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceDetail {
    #[serde(flatten)]
    pub device: Device,
    pub extensions: Vec<Extension>,
}

fn default_status() -> DeviceStatus {
    DeviceStatus::Offline
}
