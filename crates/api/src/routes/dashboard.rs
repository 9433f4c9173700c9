//! Campus dashboard.

use axum::{extract::State, routing::get, Json, Router};
use domain::models::{DashboardSummary, Device};
use persistence::repositories::DeviceRepository;
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::monitoring;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let settings = state.settings().await;

    let counts = monitoring::campus_counts(&state.pool).await?;
    let buildings = monitoring::building_statuses(&state.pool, &settings).await?;
    let critical = DeviceRepository::new(state.pool.clone())
        .find_offline_critical()
        .await?
        .into_iter()
        .map(Device::from)
        .collect();

    let summary = DashboardSummary::new(counts, buildings, critical, &settings);
    debug!(
        total_devices = summary.total_devices,
        offline_devices = summary.offline_devices,
        alert_level = summary.alert_level.as_str(),
        "Dashboard built"
    );

    Ok(Json(summary))
}
