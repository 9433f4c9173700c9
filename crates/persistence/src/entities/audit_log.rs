//! Audit log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::AuditLog;
use sqlx::FromRow;

/// Database row mapping for the audit_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogEntity {
    pub id: i64,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub summary: String,
    pub details: Option<serde_json::Value>,
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLogEntity> for AuditLog {
    fn from(entity: AuditLogEntity) -> Self {
        Self {
            id: entity.id,
            action: entity.action,
            resource_type: entity.resource_type,
            resource_id: entity.resource_id,
            summary: entity.summary,
            details: entity.details,
            request_id: entity.request_id,
            created_at: entity.created_at,
        }
    }
}
