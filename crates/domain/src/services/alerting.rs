//! Alert evaluation over building statuses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{AlertLevel, AlertSettings, BuildingStatus, Device};

/// A building currently above the upper threshold.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BuildingAlert {
    pub building_id: i64,
    pub building_name: String,
    pub offline_devices: i64,
    pub total_devices: i64,
    pub offline_percentage: f64,
}

/// An offline device flagged as critical.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CriticalDeviceAlert {
    pub device_id: i64,
    pub ip_address: String,
    pub mac_address: String,
    pub owner: Option<String>,
}

impl From<&Device> for CriticalDeviceAlert {
    fn from(device: &Device) -> Self {
        Self {
            device_id: device.id,
            ip_address: device.ip_address.clone(),
            mac_address: device.mac_address.clone(),
            owner: device.owner.clone(),
        }
    }
}

/// Everything a critical-alert notification needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CriticalAlert {
    pub upper_threshold: i32,
    pub buildings: Vec<BuildingAlert>,
    pub critical_devices: Vec<CriticalDeviceAlert>,
    pub generated_at: DateTime<Utc>,
}

impl CriticalAlert {
    pub fn subject(&self) -> String {
        match (self.buildings.len(), self.critical_devices.len()) {
            (0, n) => format!("Critical alert: {} critical device(s) offline", n),
            (b, 0) => format!(
                "Critical alert: {} building(s) above {}% offline",
                b, self.upper_threshold
            ),
            (b, n) => format!(
                "Critical alert: {} building(s) above {}% offline, {} critical device(s) offline",
                b, self.upper_threshold, n
            ),
        }
    }

    /// Plain-text body listing every affected building and device.
    pub fn body_text(&self) -> String {
        let mut lines = vec![format!(
            "Alert threshold: {}% offline ({})",
            self.upper_threshold,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        )];

        if !self.buildings.is_empty() {
            lines.push(String::new());
            lines.push("Buildings:".to_string());
            for b in &self.buildings {
                lines.push(format!(
                    "  - {}: {}/{} offline ({:.1}%)",
                    b.building_name, b.offline_devices, b.total_devices, b.offline_percentage
                ));
            }
        }

        if !self.critical_devices.is_empty() {
            lines.push(String::new());
            lines.push("Critical devices offline:".to_string());
            for d in &self.critical_devices {
                lines.push(format!(
                    "  - {} ({}){}",
                    d.ip_address,
                    d.mac_address,
                    d.owner
                        .as_deref()
                        .map(|o| format!(", owner {}", o))
                        .unwrap_or_default()
                ));
            }
        }

        lines.join("\n")
    }
}

/// Buildings classified red under `settings`.
pub fn red_buildings(settings: &AlertSettings, buildings: &[BuildingStatus]) -> Vec<BuildingAlert> {
    buildings
        .iter()
        .filter(|b| settings.alert_level(b.offline_percentage) == AlertLevel::Red)
        .map(|b| BuildingAlert {
            building_id: b.id,
            building_name: b.name.clone(),
            offline_devices: b.offline_devices,
            total_devices: b.total_devices,
            offline_percentage: b.offline_percentage,
        })
        .collect()
}

/// Builds a critical alert, or `None` when alerting is off or nothing is wrong.
pub fn evaluate(
    settings: &AlertSettings,
    buildings: &[BuildingStatus],
    offline_critical_devices: &[Device],
) -> Option<CriticalAlert> {
    if !settings.is_active {
        return None;
    }

    let buildings = red_buildings(settings, buildings);
    let critical_devices: Vec<CriticalDeviceAlert> =
        offline_critical_devices.iter().map(Into::into).collect();

    if buildings.is_empty() && critical_devices.is_empty() {
        return None;
    }

    Some(CriticalAlert {
        upper_threshold: settings.upper_threshold,
        buildings,
        critical_devices,
        generated_at: Utc::now(),
    })
}
