//! Domain services for VoIP Monitor.
//!
//! Services contain business logic that operates on domain models.

pub mod alerting;
pub mod notification;

pub use alerting::{evaluate, red_buildings, BuildingAlert, CriticalAlert, CriticalDeviceAlert};
pub use notification::{
    dispatch, enabled_channels, AlertNotifier, MockAlertNotifier, NotificationChannel,
    NotificationResult,
};
