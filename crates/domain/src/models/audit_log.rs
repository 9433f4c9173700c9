//! Audit log domain models.
//!
//! Administrative changes are appended to `audit_logs` and never updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;

/// Resource types that can be audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Settings,
    Building,
    Network,
    Device,
    Extension,
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "settings" => Ok(ResourceType::Settings),
            "building" => Ok(ResourceType::Building),
            "network" => Ok(ResourceType::Network),
            "device" => Ok(ResourceType::Device),
            "extension" => Ok(ResourceType::Extension),
            _ => Err(format!("Unknown resource type: {}", s)),
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Settings => write!(f, "settings"),
            ResourceType::Building => write!(f, "building"),
            ResourceType::Network => write!(f, "network"),
            ResourceType::Device => write!(f, "device"),
            ResourceType::Extension => write!(f, "extension"),
        }
    }
}

/// Audited actions, formatted as `resource.operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    SettingsUpdate,
    BuildingCreate,
    BuildingDelete,
    NetworkCreate,
    NetworkDelete,
    DeviceCreate,
    DeviceDelete,
    DeviceStatusSync,
    DeviceCleanup,
    ExtensionCreate,
    ExtensionDelete,
}

impl AuditAction {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            AuditAction::SettingsUpdate => ResourceType::Settings,
            AuditAction::BuildingCreate | AuditAction::BuildingDelete => ResourceType::Building,
            AuditAction::NetworkCreate | AuditAction::NetworkDelete => ResourceType::Network,
            AuditAction::DeviceCreate
            | AuditAction::DeviceDelete
            | AuditAction::DeviceStatusSync
            | AuditAction::DeviceCleanup => ResourceType::Device,
            AuditAction::ExtensionCreate | AuditAction::ExtensionDelete => ResourceType::Extension,
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditAction::SettingsUpdate => "settings.update",
            AuditAction::BuildingCreate => "building.create",
            AuditAction::BuildingDelete => "building.delete",
            AuditAction::NetworkCreate => "network.create",
            AuditAction::NetworkDelete => "network.delete",
            AuditAction::DeviceCreate => "device.create",
            AuditAction::DeviceDelete => "device.delete",
            AuditAction::DeviceStatusSync => "device.status_sync",
            AuditAction::DeviceCleanup => "device.cleanup",
            AuditAction::ExtensionCreate => "extension.create",
            AuditAction::ExtensionDelete => "extension.delete",
        };
        f.write_str(s)
    }
}

/// A stored audit entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditLog {
    pub id: i64,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending an audit entry.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub resource_id: Option<String>,
    pub summary: String,
    pub details: Option<JsonValue>,
    pub request_id: Option<String>,
}

impl NewAuditEntry {
    pub fn new(action: AuditAction, summary: impl Into<String>) -> Self {
        Self {
            action,
            resource_id: None,
            summary: summary.into(),
            details: None,
            request_id: None,
        }
    }

    pub fn resource(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Query parameters for listing audit entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAuditLogsQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
    pub resource_type: Option<String>,
}

/// One page of audit entries, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ListAuditLogsResponse {
    pub entries: Vec<AuditLog>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
