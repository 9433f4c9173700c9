//! Periodic alert evaluation.
//!
//! Classifies every building under the current thresholds, counts buildings
//! that turned red since the previous pass, and hands a critical alert to the
//! notifier when alerting is active, at least one channel is enabled, and the
//! alert names a building or device not already alerted on.

use std::collections::HashSet;
use std::sync::Arc;

use domain::models::{AlertSettings, BuildingStatus, Device};
use domain::services::{
    dispatch, evaluate, red_buildings, AlertNotifier, CriticalAlert, NotificationChannel,
    NotificationResult,
};
use persistence::repositories::DeviceRepository;
use sqlx::PgPool;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::scheduler::{Job, JobError, JobFrequency};
use crate::middleware::metrics::record_alerts_raised;
use crate::services::monitoring;

/// What earlier passes already reported.
#[derive(Debug, Default)]
struct AlertTracker {
    red: HashSet<i64>,
    alerted_buildings: HashSet<i64>,
    alerted_devices: HashSet<i64>,
}

impl AlertTracker {
    /// Records the current red buildings and returns how many are new.
    fn observe_red(&mut self, red: HashSet<i64>) -> usize {
        let new = red.difference(&self.red).count();
        self.red = red;
        new
    }

    /// Records the current alert and returns true when it names a building
    /// or device the last alert did not. No alert clears the record, so a
    /// recurrence is reported again.
    fn observe_alert(&mut self, alert: Option<&CriticalAlert>) -> bool {
        let Some(alert) = alert else {
            self.alerted_buildings.clear();
            self.alerted_devices.clear();
            return false;
        };

        let buildings: HashSet<i64> = alert.buildings.iter().map(|b| b.building_id).collect();
        let devices: HashSet<i64> = alert.critical_devices.iter().map(|d| d.device_id).collect();
        let changed = !buildings.is_subset(&self.alerted_buildings)
            || !devices.is_subset(&self.alerted_devices);

        self.alerted_buildings = buildings;
        self.alerted_devices = devices;
        changed
    }
}

/// Raises critical alerts for red buildings and offline critical devices.
///
/// An ongoing incident is notified once; it is notified again only when it
/// grows or after it has cleared.
pub struct AlertEvaluationJob {
    pool: PgPool,
    settings: Arc<RwLock<AlertSettings>>,
    notifier: Arc<dyn AlertNotifier>,
    interval_minutes: u64,
    tracker: Mutex<AlertTracker>,
}

impl AlertEvaluationJob {
    /// Reads thresholds from `settings` on every run, so updates apply from
    /// the next pass.
    pub fn new(
        pool: PgPool,
        settings: Arc<RwLock<AlertSettings>>,
        notifier: Arc<dyn AlertNotifier>,
        interval_minutes: u64,
    ) -> Self {
        Self {
            pool,
            settings,
            notifier,
            interval_minutes,
            tracker: Mutex::new(AlertTracker::default()),
        }
    }
}

#[async_trait::async_trait]
impl Job for AlertEvaluationJob {
    fn name(&self) -> &'static str {
        "alert_evaluation"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), JobError> {
        let settings = self.settings.read().await.clone();
        let buildings = monitoring::building_statuses(&self.pool, &settings).await?;
        let critical: Vec<Device> = DeviceRepository::new(self.pool.clone())
            .find_offline_critical()
            .await?
            .into_iter()
            .map(Device::from)
            .collect();

        let mut tracker = self.tracker.lock().await;
        let results = raise_alerts(
            self.notifier.as_ref(),
            &mut tracker,
            &settings,
            &buildings,
            &critical,
        )
        .await;
        drop(tracker);
        for (channel, result) in &results {
            if let NotificationResult::Failed(reason) = result {
                warn!(%channel, reason = %reason, "Alert notification failed");
            }
        }
        Ok(())
    }
}

/// Counts newly red buildings and sends the alert, if it is new, on every
/// enabled channel.
async fn raise_alerts(
    notifier: &dyn AlertNotifier,
    tracker: &mut AlertTracker,
    settings: &AlertSettings,
    buildings: &[BuildingStatus],
    critical: &[Device],
) -> Vec<(NotificationChannel, NotificationResult)> {
    let red = red_buildings(settings, buildings)
        .iter()
        .map(|b| b.building_id)
        .collect();
    record_alerts_raised(tracker.observe_red(red));

    let alert = evaluate(settings, buildings, critical);
    if !tracker.observe_alert(alert.as_ref()) {
        debug!(
            buildings = buildings.len(),
            ongoing = alert.is_some(),
            "No new alert conditions"
        );
        return Vec::new();
    }
    let Some(alert) = alert else {
        return Vec::new();
    };

    info!(
        red_buildings = alert.buildings.len(),
        critical_devices = alert.critical_devices.len(),
        upper_threshold = alert.upper_threshold,
        "Critical alert raised"
    );

    if !settings.notifications_enabled() {
        return Vec::new();
    }
    dispatch(notifier, settings, &alert).await
}
