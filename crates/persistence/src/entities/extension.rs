//! Extension entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Extension;
use sqlx::FromRow;

/// Database row mapping for the extensions table.
#[derive(Debug, Clone, FromRow)]
pub struct ExtensionEntity {
    pub id: i64,
    pub extension_number: String,
    pub user_first_name: String,
    pub user_last_name: String,
    pub devices_registered: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExtensionEntity> for Extension {
    fn from(entity: ExtensionEntity) -> Self {
        Self {
            id: entity.id,
            extension_number: entity.extension_number,
            user_first_name: entity.user_first_name,
            user_last_name: entity.user_last_name,
            devices_registered: entity.devices_registered,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
