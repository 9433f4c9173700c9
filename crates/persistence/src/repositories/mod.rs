//! Repository implementations for database operations.

pub mod alert_settings;
pub mod audit_log;
pub mod building;
pub mod device;
pub mod device_activity;
pub mod extension;
pub mod network;

pub use alert_settings::AlertSettingsRepository;
pub use audit_log::AuditLogRepository;
pub use building::BuildingRepository;
pub use device::{DeviceFilter, DeviceRepository};
pub use device_activity::{ActivityWriteError, DeviceActivityRepository, RotationSummary};
pub use extension::ExtensionRepository;
pub use network::NetworkRepository;
