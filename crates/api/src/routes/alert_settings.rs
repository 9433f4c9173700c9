//! Alert settings routes.
//!
//! Reads are served from the copy held in application state. Updates are
//! written through to the database before the copy is replaced.

use axum::{extract::State, routing::{get, post}, Json, Router};
use domain::models::alert_settings::{
    ClassifyRequest, ClassifyResponse, UpdateAlertSettingsRequest,
};
use domain::models::{AlertSettings, AuditAction, NewAuditEntry};
use persistence::repositories::AlertSettingsRepository;
use serde_json::json;
use shared::validation::validate_percentage;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::services::audit;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_settings).put(update_settings))
        .route("/classify", post(classify))
}

/// GET /api/v1/alert-settings
pub async fn get_settings(State(state): State<AppState>) -> Json<AlertSettings> {
    Json(state.settings().await)
}

/// PUT /api/v1/alert-settings
pub async fn update_settings(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<UpdateAlertSettingsRequest>,
) -> Result<Json<AlertSettings>, ApiError> {
    request.validate()?;

    // Held across the write so concurrent updates apply in order.
    let mut current = state.alert_settings.write().await;
    let previous = current.clone();
    let updated = previous.apply(&request)?;

    let saved: AlertSettings = AlertSettingsRepository::new(state.pool.clone())
        .save(&updated)
        .await?
        .into();
    *current = saved.clone();
    drop(current);

    info!(
        lower_threshold = saved.lower_threshold,
        upper_threshold = saved.upper_threshold,
        is_active = saved.is_active,
        "Alert settings updated"
    );

    audit::record(
        &state.pool,
        &request_id,
        NewAuditEntry::new(
            AuditAction::SettingsUpdate,
            format!(
                "Thresholds set to {}/{}",
                saved.lower_threshold, saved.upper_threshold
            ),
        )
        .details(json!({
            "before": previous,
            "after": saved,
        })),
    )
    .await;

    Ok(Json(saved))
}

/// POST /api/v1/alert-settings/classify
pub async fn classify(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    validate_percentage(request.offline_percentage).map_err(|e| {
        ApiError::Validation(format!(
            "offline_percentage: {}",
            e.message.unwrap_or_default()
        ))
    })?;

    let settings = state.settings().await;
    Ok(Json(ClassifyResponse {
        offline_percentage: request.offline_percentage,
        alert_level: settings.alert_level(request.offline_percentage),
    }))
}
