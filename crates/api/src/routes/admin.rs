//! Campus-wide maintenance operations.

use axum::{
    extract::State,
    routing::{delete, post},
    Json, Router,
};
use domain::models::{AuditAction, NewAuditEntry};
use persistence::repositories::DeviceRepository;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::services::{audit, monitoring};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/networks/recount", post(recount_all))
        .route("/devices/offline", delete(cleanup_offline_devices))
}

#[derive(Debug, Serialize)]
pub struct RecountAllResponse {
    pub networks_recounted: u64,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub devices_deleted: u64,
    pub networks_recounted: u64,
}

/// POST /api/v1/admin/networks/recount
pub async fn recount_all(
    State(state): State<AppState>,
) -> Result<Json<RecountAllResponse>, ApiError> {
    let networks_recounted = monitoring::recount_all_networks(&state.pool).await?;
    info!(networks_recounted, "All networks recounted");
    Ok(Json(RecountAllResponse { networks_recounted }))
}

/// DELETE /api/v1/admin/devices/offline
///
/// Removes offline devices that are not flagged critical.
pub async fn cleanup_offline_devices(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<Json<CleanupResponse>, ApiError> {
    let (devices_deleted, network_ids) = DeviceRepository::new(state.pool.clone())
        .delete_offline_non_critical()
        .await?;

    let networks_recounted = monitoring::recount_networks(&state.pool, &network_ids).await?;

    info!(devices_deleted, networks_recounted, "Offline devices removed");

    if devices_deleted > 0 {
        audit::record(
            &state.pool,
            &request_id,
            NewAuditEntry::new(
                AuditAction::DeviceCleanup,
                format!("Removed {} offline non-critical device(s)", devices_deleted),
            )
            .details(json!({ "network_ids": network_ids })),
        )
        .await;
    }

    Ok(Json(CleanupResponse {
        devices_deleted,
        networks_recounted,
    }))
}
