//! Alert settings entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::AlertSettings;
use sqlx::FromRow;

/// Database row mapping for the singleton alert_settings row.
#[derive(Debug, Clone, FromRow)]
pub struct AlertSettingsEntity {
    pub id: i16,
    pub lower_threshold: i32,
    pub upper_threshold: i32,
    pub is_active: bool,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AlertSettingsEntity> for AlertSettings {
    fn from(entity: AlertSettingsEntity) -> Self {
        Self {
            lower_threshold: entity.lower_threshold,
            upper_threshold: entity.upper_threshold,
            is_active: entity.is_active,
            email_notifications: entity.email_notifications,
            push_notifications: entity.push_notifications,
            updated_at: Some(entity.updated_at),
        }
    }
}
