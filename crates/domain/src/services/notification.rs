//! Alert notification abstraction.
//!
//! Delivery (mail relay, push gateway) lives outside the domain; the domain
//! only decides what to send and on which channels.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use super::alerting::CriticalAlert;
use crate::models::AlertSettings;

/// Delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Push,
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationChannel::Email => write!(f, "email"),
            NotificationChannel::Push => write!(f, "push"),
        }
    }
}

/// Channels switched on in the settings.
pub fn enabled_channels(settings: &AlertSettings) -> Vec<NotificationChannel> {
    let mut channels = Vec::new();
    if settings.email_notifications {
        channels.push(NotificationChannel::Email);
    }
    if settings.push_notifications {
        channels.push(NotificationChannel::Push);
    }
    channels
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    Sent,
    /// No channel enabled.
    Skipped,
    /// Delivery failed; alerting carries on.
    Failed(String),
}

/// Sends critical alerts.
#[async_trait::async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn send_critical_alert(
        &self,
        channel: NotificationChannel,
        alert: &CriticalAlert,
    ) -> NotificationResult;
}

/// Sends `alert` on every enabled channel and returns the per-channel results.
pub async fn dispatch(
    notifier: &dyn AlertNotifier,
    settings: &AlertSettings,
    alert: &CriticalAlert,
) -> Vec<(NotificationChannel, NotificationResult)> {
    let mut results = Vec::new();
    for channel in enabled_channels(settings) {
        let result = notifier.send_critical_alert(channel, alert).await;
        results.push((channel, result));
    }
    results
}

/// Records alerts in memory instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct MockAlertNotifier {
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<(NotificationChannel, String)>>>,
}

impl MockAlertNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// `(channel, subject)` of every alert sent so far.
    pub fn sent(&self) -> Vec<(NotificationChannel, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl AlertNotifier for MockAlertNotifier {
    async fn send_critical_alert(
        &self,
        channel: NotificationChannel,
        alert: &CriticalAlert,
    ) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(%channel, "Mock notifier simulating failure");
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push((channel, alert.subject()));
        }
        NotificationResult::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn alert() -> CriticalAlert {
        CriticalAlert {
            upper_threshold: 70,
            buildings: vec![],
            critical_devices: vec![],
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_enabled_channels() {
        let mut settings = AlertSettings::default();
        assert!(enabled_channels(&settings).is_empty());

        settings.email_notifications = true;
        assert_eq!(enabled_channels(&settings), vec![NotificationChannel::Email]);

        settings.push_notifications = true;
        assert_eq!(
            enabled_channels(&settings),
            vec![NotificationChannel::Email, NotificationChannel::Push]
        );
    }

    #[tokio::test]
    async fn test_dispatch_sends_per_channel() {
        let notifier = MockAlertNotifier::new();
        let settings = AlertSettings {
            email_notifications: true,
            push_notifications: true,
            ..AlertSettings::default()
        };

        let results = dispatch(&notifier, &settings, &alert()).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| *r == NotificationResult::Sent));
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_without_channels() {
        let notifier = MockAlertNotifier::new();
        let results = dispatch(&notifier, &AlertSettings::default(), &alert()).await;
        assert!(results.is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failing_notifier() {
        let notifier = MockAlertNotifier::failing();
        let settings = AlertSettings {
            push_notifications: true,
            ..AlertSettings::default()
        };
        let results = dispatch(&notifier, &settings, &alert()).await;
        assert_eq!(
            results,
            vec![(
                NotificationChannel::Push,
                NotificationResult::Failed("Simulated failure".to_string())
            )]
        );
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(NotificationChannel::Email.to_string(), "email");
        assert_eq!(NotificationChannel::Push.to_string(), "push");
    }
}
