//! Phone extension domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A phone extension. `devices_registered` is a denormalized count of the
/// devices linked through `device_extensions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Extension {
    pub id: i64,
    pub extension_number: String,
    pub user_first_name: String,
    pub user_last_name: String,
    pub devices_registered: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Extension {
    pub fn user_full_name(&self) -> String {
        format!("{} {}", self.user_first_name, self.user_last_name)
            .trim()
            .to_string()
    }
}

/// Request payload for creating an extension.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExtensionRequest {
    #[validate(custom(function = "shared::validation::validate_extension_number"))]
    pub extension_number: String,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    #[serde(default)]
    pub user_first_name: String,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    #[serde(default)]
    pub user_last_name: String,
}

/// Request payload for a partial extension update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateExtensionRequest {
    #[validate(custom(function = "shared::validation::validate_extension_number"))]
    pub extension_number: Option<String>,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub user_first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub user_last_name: Option<String>,
}
