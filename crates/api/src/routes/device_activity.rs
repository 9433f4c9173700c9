//! Device activity routes: the two-day ring of five-minute samples.

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use domain::models::device_activity::{ActivityQuery, ActivityResponse, SetSampleRequest};
use domain::models::{ActivityDay, DeviceActivity};
use persistence::repositories::{DeviceActivityRepository, DeviceRepository};
use tracing::{debug, info};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/activity", get(get_activity))
        .route("/:id/activity/samples/:index", put(set_sample))
}

async fn ensure_device(state: &AppState, id: i64) -> Result<(), ApiError> {
    DeviceRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;
    Ok(())
}

/// GET /api/v1/devices/:id/activity?day=1|2
///
/// A device without a row for the day gets an all-zero sample array.
pub async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let day = ActivityDay::from_day_number(query.day)?;
    ensure_device(&state, id).await?;

    let activity = DeviceActivityRepository::new(state.pool.clone())
        .find(id, day, Utc::now().date_naive())
        .await?
        .map(DeviceActivity::try_from)
        .transpose()?;

    debug!(device_id = id, day = day.day_number(), found = activity.is_some(), "Activity read");

    Ok(Json(ActivityResponse::new(id, day, activity)))
}

/// PUT /api/v1/devices/:id/activity/samples/:index
///
/// Writes one sample into today's row, creating or rotating it as needed.
pub async fn set_sample(
    State(state): State<AppState>,
    Path((id, index)): Path<(i64, usize)>,
    Json(request): Json<SetSampleRequest>,
) -> Result<Json<ActivityResponse>, ApiError> {
    request.validate()?;
    ensure_device(&state, id).await?;

    let activity = DeviceActivityRepository::new(state.pool.clone())
        .set_sample(id, Utc::now().date_naive(), index, request.status)
        .await?;

    info!(device_id = id, index, status = request.status, "Activity sample written");

    Ok(Json(ActivityResponse::new(
        id,
        ActivityDay::Today,
        Some(activity),
    )))
}
