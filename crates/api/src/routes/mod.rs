//! HTTP route handlers.

pub mod admin;
pub mod alert_settings;
pub mod audit_logs;
pub mod buildings;
pub mod dashboard;
pub mod device_activity;
pub mod devices;
pub mod extensions;
pub mod health;
pub mod networks;
