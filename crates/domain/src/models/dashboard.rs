//! Dashboard summary models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::alert_settings::{AlertLevel, AlertSettings};
use super::building::BuildingStatus;
use super::device::Device;
use super::network::DeviceCounts;

/// Thresholds echoed to the dashboard so it can draw the legend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ThresholdInfo {
    pub lower_threshold: i32,
    pub upper_threshold: i32,
    pub is_active: bool,
}

impl From<&AlertSettings> for ThresholdInfo {
    fn from(settings: &AlertSettings) -> Self {
        Self {
            lower_threshold: settings.lower_threshold,
            upper_threshold: settings.upper_threshold,
            is_active: settings.is_active,
        }
    }
}

/// Campus-wide status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardSummary {
    pub total_devices: i64,
    pub offline_devices: i64,
    pub online_devices: i64,
    pub offline_percentage: f64,
    pub alert_level: AlertLevel,
    pub thresholds: ThresholdInfo,
    pub buildings: Vec<BuildingStatus>,
    pub offline_critical_devices: Vec<Device>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardSummary {
    /// Builds the summary from campus-wide counts.
    ///
    /// Campus totals come from the networks table directly, since a network
    /// may belong to several buildings and summing buildings would double count.
    pub fn new(
        counts: DeviceCounts,
        buildings: Vec<BuildingStatus>,
        offline_critical_devices: Vec<Device>,
        settings: &AlertSettings,
    ) -> Self {
        let offline_percentage = counts.offline_percentage();
        Self {
            total_devices: counts.total,
            offline_devices: counts.offline,
            online_devices: counts.online(),
            offline_percentage,
            alert_level: settings.alert_level(offline_percentage),
            thresholds: settings.into(),
            buildings,
            offline_critical_devices,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_levels() {
        let settings = AlertSettings::default();
        let summary = DashboardSummary::new(DeviceCounts::new(200, 50), vec![], vec![], &settings);
        assert_eq!(summary.offline_percentage, 25.0);
        assert_eq!(summary.online_devices, 150);
        assert_eq!(summary.alert_level, AlertLevel::Green);
        assert_eq!(summary.thresholds.upper_threshold, 70);
    }

    #[test]
    fn test_summary_empty_campus() {
        let summary = DashboardSummary::new(
            DeviceCounts::default(),
            vec![],
            vec![],
            &AlertSettings::default(),
        );
        assert_eq!(summary.offline_percentage, 0.0);
        assert_eq!(summary.alert_level, AlertLevel::Green);
    }
}
