//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod alert_settings;
pub mod audit_log;
pub mod building;
pub mod device;
pub mod device_activity;
pub mod extension;
pub mod network;

pub use alert_settings::AlertSettingsEntity;
pub use audit_log::AuditLogEntity;
pub use building::{BuildingEntity, BuildingStatusEntity};
pub use device::DeviceEntity;
pub use device_activity::DeviceActivityEntity;
pub use extension::ExtensionEntity;
pub use network::{CampusCountsEntity, NetworkEntity};
