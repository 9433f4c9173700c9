//! Alert notifier that writes critical alerts to the log.
//!
//! Mail and push delivery are handled by an external relay that tails the
//! structured log; this service only emits the event.

use domain::services::{AlertNotifier, CriticalAlert, NotificationChannel, NotificationResult};
use tracing::warn;

/// Emits each alert as one warn event on the `voip_monitor::alerts` target.
///
/// Every channel reports `Sent`; delivery is the relay's concern.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertNotifier;

#[async_trait::async_trait]
impl AlertNotifier for LogAlertNotifier {
    async fn send_critical_alert(
        &self,
        channel: NotificationChannel,
        alert: &CriticalAlert,
    ) -> NotificationResult {
        warn!(
            target: "voip_monitor::alerts",
            %channel,
            upper_threshold = alert.upper_threshold,
            buildings = alert.buildings.len(),
            critical_devices = alert.critical_devices.len(),
            subject = %alert.subject(),
            body = %alert.body_text(),
            "Critical alert"
        );
        NotificationResult::Sent
    }
}
