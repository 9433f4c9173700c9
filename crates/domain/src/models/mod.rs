//! Domain models for VoIP Monitor.

pub mod alert_settings;
pub mod audit_log;
pub mod building;
pub mod dashboard;
pub mod device;
pub mod device_activity;
pub mod extension;
pub mod network;

pub use alert_settings::{AlertLevel, AlertSettings, ThresholdError};
pub use audit_log::{AuditAction, AuditLog, NewAuditEntry, ResourceType};
pub use building::{Building, BuildingStatus};
pub use dashboard::DashboardSummary;
pub use device::{Device, DeviceStatus};
pub use device_activity::{ActivityDay, DeviceActivity, SampleError};
pub use extension::Extension;
pub use network::{DeviceCounts, Network};
