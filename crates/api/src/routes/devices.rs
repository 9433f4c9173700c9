//! Device routes.
//!
//! Every write that can move a device between networks or change its status
//! recounts the affected networks before responding.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use domain::models::device::{
    CreateDeviceRequest, DeviceDetail, ListDevicesQuery, ListDevicesResponse, StatusSyncRequest,
    StatusSyncResponse, UpdateDeviceRequest, UpdateStatusRequest,
};
use domain::models::device_activity::sample_index;
use domain::models::{AuditAction, Device, Extension, NewAuditEntry};
use persistence::repositories::{
    DeviceActivityRepository, DeviceFilter, DeviceRepository, ExtensionRepository,
    NetworkRepository,
};
use serde_json::json;
use shared::pagination::PageParams;
use shared::validation::{normalize_mac_address, subnet_contains};
use sqlx::PgPool;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::services::{audit, monitoring};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_devices).post(create_device))
        .route("/status-sync", post(status_sync))
        .route(
            "/:id",
            get(get_device).put(update_device).delete(delete_device),
        )
        .route("/:id/status", put(update_status))
        .route(
            "/:id/extensions/:extension_id",
            put(attach_extension).delete(detach_extension),
        )
}

fn not_found() -> ApiError {
    ApiError::NotFound("Device not found".to_string())
}

/// Rejects an address outside the subnet of `network_id`.
async fn check_placement(pool: &PgPool, network_id: i64, ip_address: &str) -> Result<(), ApiError> {
    let network = NetworkRepository::new(pool.clone())
        .find_by_id(network_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Network not found".to_string()))?;

    if !subnet_contains(&network.subnet, ip_address) {
        return Err(ApiError::Validation(format!(
            "IP address {} is outside network {}",
            ip_address, network.subnet
        )));
    }
    Ok(())
}

/// GET /api/v1/devices
pub async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<ListDevicesQuery>,
) -> Result<Json<ListDevicesResponse>, ApiError> {
    let filter = DeviceFilter {
        network_id: query.network_id,
        status: query.status,
        is_critical: query.is_critical,
    };
    let page = PageParams {
        page: query.page,
        per_page: query.per_page,
    };

    let repo = DeviceRepository::new(state.pool.clone());
    let total = repo.count(&filter).await?;
    let devices = repo
        .list(&filter, page.per_page(), page.offset())
        .await?
        .into_iter()
        .map(Device::from)
        .collect();

    Ok(Json(ListDevicesResponse {
        devices,
        page: page.page(),
        per_page: page.per_page(),
        total,
    }))
}

/// GET /api/v1/devices/:id
pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeviceDetail>, ApiError> {
    let device = DeviceRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(not_found)?;

    let extensions = ExtensionRepository::new(state.pool.clone())
        .list_by_device(id)
        .await?
        .into_iter()
        .map(Extension::from)
        .collect();

    Ok(Json(DeviceDetail {
        device: device.into(),
        extensions,
    }))
}

/// POST /api/v1/devices
pub async fn create_device(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    request.validate()?;
    check_placement(&state.pool, request.network_id, &request.ip_address).await?;

    let mac_address = normalize_mac_address(&request.mac_address);
    let device: Device = DeviceRepository::new(state.pool.clone())
        .create(
            &mac_address,
            &request.ip_address,
            request.network_id,
            request.status,
            request.is_critical,
            request.owner.as_deref(),
        )
        .await?
        .into();

    monitoring::recount_networks(&state.pool, &[device.network_id]).await?;

    info!(
        device_id = device.id,
        ip_address = %device.ip_address,
        network_id = device.network_id,
        "Device created"
    );

    audit::record(
        &state.pool,
        &request_id,
        NewAuditEntry::new(
            AuditAction::DeviceCreate,
            format!("Created device {}", device.ip_address),
        )
        .resource(device.id)
        .details(json!({
            "mac_address": device.mac_address,
            "network_id": device.network_id,
            "is_critical": device.is_critical,
        })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(device)))
}

/// PUT /api/v1/devices/:id
pub async fn update_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateDeviceRequest>,
) -> Result<Json<Device>, ApiError> {
    request.validate()?;

    let repo = DeviceRepository::new(state.pool.clone());
    let current = repo.find_by_id(id).await?.ok_or_else(not_found)?;

    let network_id = request.network_id.unwrap_or(current.network_id);
    let ip_address = request
        .ip_address
        .clone()
        .unwrap_or_else(|| current.ip_address.clone());
    if request.network_id.is_some() || request.ip_address.is_some() {
        check_placement(&state.pool, network_id, &ip_address).await?;
    }

    let mac_address = request.mac_address.as_deref().map(normalize_mac_address);
    let device: Device = repo
        .update(
            id,
            mac_address.as_deref(),
            request.ip_address.as_deref(),
            request.network_id,
            request.is_critical,
            request.owner.as_deref(),
        )
        .await?
        .ok_or_else(not_found)?
        .into();

    if device.network_id != current.network_id {
        monitoring::recount_networks(&state.pool, &[current.network_id, device.network_id])
            .await?;
    }

    info!(device_id = id, ip_address = %device.ip_address, "Device updated");

    Ok(Json(device))
}

/// DELETE /api/v1/devices/:id
pub async fn delete_device(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let device: Device = DeviceRepository::new(state.pool.clone())
        .delete(id)
        .await?
        .ok_or_else(not_found)?
        .into();

    monitoring::recount_networks(&state.pool, &[device.network_id]).await?;

    info!(device_id = id, ip_address = %device.ip_address, "Device deleted");

    audit::record(
        &state.pool,
        &request_id,
        NewAuditEntry::new(
            AuditAction::DeviceDelete,
            format!("Deleted device {}", device.ip_address),
        )
        .resource(id)
        .details(json!({
            "mac_address": device.mac_address,
            "network_id": device.network_id,
        })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/devices/:id/status
///
/// Also records the status in today's activity row for the current bucket.
/// The network is recounted before the sample write so a failed write never
/// leaves the counts behind the committed status.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Device>, ApiError> {
    let device: Device = DeviceRepository::new(state.pool.clone())
        .set_status(id, request.status)
        .await?
        .ok_or_else(not_found)?
        .into();

    monitoring::recount_networks(&state.pool, &[device.network_id]).await?;

    let now = Utc::now();
    DeviceActivityRepository::new(state.pool.clone())
        .set_sample(
            id,
            now.date_naive(),
            sample_index(now.time()),
            request.status.sample_code(),
        )
        .await?;

    info!(device_id = id, status = %device.status, "Device status updated");

    Ok(Json(device))
}

/// POST /api/v1/devices/status-sync
///
/// Applies statuses by IP address. Unknown addresses are reported back, and
/// each touched network is recounted once.
pub async fn status_sync(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<StatusSyncRequest>,
) -> Result<Json<StatusSyncResponse>, ApiError> {
    request.validate()?;

    let updates: Vec<_> = request
        .updates
        .iter()
        .map(|u| (u.ip_address.clone(), u.status))
        .collect();

    let updated = DeviceRepository::new(state.pool.clone())
        .set_status_by_ip(&updates)
        .await?;

    let known: HashSet<&str> = updated.iter().map(|d| d.ip_address.as_str()).collect();
    let mut unknown_ip_addresses: Vec<String> = request
        .updates
        .iter()
        .map(|u| u.ip_address.as_str())
        .filter(|ip| !known.contains(ip))
        .map(str::to_string)
        .collect();
    unknown_ip_addresses.sort();
    unknown_ip_addresses.dedup();

    let mut network_ids: Vec<i64> = updated.iter().map(|d| d.network_id).collect();
    network_ids.sort_unstable();
    network_ids.dedup();
    monitoring::recount_networks(&state.pool, &network_ids).await?;

    if !unknown_ip_addresses.is_empty() {
        warn!(
            count = unknown_ip_addresses.len(),
            "Status sync referenced unknown IP addresses"
        );
    }
    info!(
        updated = updated.len(),
        networks = network_ids.len(),
        "Device statuses synced"
    );

    audit::record(
        &state.pool,
        &request_id,
        NewAuditEntry::new(
            AuditAction::DeviceStatusSync,
            format!("Synced status of {} device(s)", updated.len()),
        )
        .details(json!({
            "submitted": request.updates.len(),
            "updated": updated.len(),
            "unknown_ip_addresses": unknown_ip_addresses,
        })),
    )
    .await;

    Ok(Json(StatusSyncResponse {
        updated: updated.len() as u64,
        unknown_ip_addresses,
        networks_recounted: network_ids.len(),
    }))
}

/// PUT /api/v1/devices/:id/extensions/:extension_id
///
/// 201 when newly registered, 204 when the registration already existed.
pub async fn attach_extension(
    State(state): State<AppState>,
    Path((id, extension_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let attached = DeviceRepository::new(state.pool.clone())
        .attach_extension(id, extension_id)
        .await?;

    info!(device_id = id, extension_id, attached, "Extension registered on device");

    Ok(if attached {
        StatusCode::CREATED
    } else {
        StatusCode::NO_CONTENT
    })
}

/// DELETE /api/v1/devices/:id/extensions/:extension_id
pub async fn detach_extension(
    State(state): State<AppState>,
    Path((id, extension_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let removed = DeviceRepository::new(state.pool.clone())
        .detach_extension(id, extension_id)
        .await?;

    if removed == 0 {
        return Err(ApiError::NotFound(
            "Extension is not registered on this device".to_string(),
        ));
    }

    info!(device_id = id, extension_id, "Extension removed from device");

    Ok(StatusCode::NO_CONTENT)
}
