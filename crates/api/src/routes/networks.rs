//! Network routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use domain::models::network::{
    CreateNetworkRequest, NetworkResponse, RecountResponse, UpdateNetworkRequest,
};
use domain::models::{AuditAction, Device, NewAuditEntry, Network};
use persistence::repositories::{DeviceRepository, NetworkRepository};
use serde_json::json;
use shared::validation::{normalize_subnet, subnet_contains};
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::services::{audit, monitoring};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_networks).post(create_network))
        .route(
            "/:id",
            get(get_network).put(update_network).delete(delete_network),
        )
        .route("/:id/recount", post(recount_network))
        .route("/:id/devices", get(list_network_devices))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Network not found".to_string())
}

/// GET /api/v1/networks
pub async fn list_networks(
    State(state): State<AppState>,
) -> Result<Json<Vec<NetworkResponse>>, ApiError> {
    let settings = state.settings().await;
    let networks = NetworkRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(|n| NetworkResponse::new(Network::from(n), &settings))
        .collect();
    Ok(Json(networks))
}

/// GET /api/v1/networks/:id
pub async fn get_network(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NetworkResponse>, ApiError> {
    let network = NetworkRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(not_found)?;

    let settings = state.settings().await;
    Ok(Json(NetworkResponse::new(network.into(), &settings)))
}

/// Host bits are cleared so one subnet has one spelling.
fn canonical_subnet(subnet: &str) -> Result<String, ApiError> {
    normalize_subnet(subnet)
        .ok_or_else(|| ApiError::Validation(format!("Invalid subnet {}", subnet)))
}

/// POST /api/v1/networks
pub async fn create_network(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<CreateNetworkRequest>,
) -> Result<(StatusCode, Json<NetworkResponse>), ApiError> {
    request.validate()?;
    let subnet = canonical_subnet(&request.subnet)?;

    let network: Network = NetworkRepository::new(state.pool.clone())
        .create(&subnet)
        .await?
        .into();

    info!(network_id = network.id, subnet = %network.subnet, "Network created");

    audit::record(
        &state.pool,
        &request_id,
        NewAuditEntry::new(
            AuditAction::NetworkCreate,
            format!("Created network {}", network.subnet),
        )
        .resource(network.id),
    )
    .await;

    let settings = state.settings().await;
    Ok((
        StatusCode::CREATED,
        Json(NetworkResponse::new(network, &settings)),
    ))
}

/// PUT /api/v1/networks/:id
///
/// Every device already in the network must still fall inside the new subnet.
pub async fn update_network(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateNetworkRequest>,
) -> Result<Json<NetworkResponse>, ApiError> {
    request.validate()?;
    let subnet = canonical_subnet(&request.subnet)?;

    let outside: Vec<String> = DeviceRepository::new(state.pool.clone())
        .ip_addresses_in_network(id)
        .await?
        .into_iter()
        .filter(|ip| !subnet_contains(&subnet, ip))
        .collect();
    if !outside.is_empty() {
        return Err(ApiError::Conflict(format!(
            "{} device(s) fall outside {}, e.g. {}",
            outside.len(),
            subnet,
            outside[0]
        )));
    }

    let network = NetworkRepository::new(state.pool.clone())
        .update_subnet(id, &subnet)
        .await?
        .ok_or_else(not_found)?;

    info!(network_id = id, subnet = %network.subnet, "Network updated");

    let settings = state.settings().await;
    Ok(Json(NetworkResponse::new(network.into(), &settings)))
}

/// DELETE /api/v1/networks/:id
///
/// Refused while any device still belongs to the network.
pub async fn delete_network(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = NetworkRepository::new(state.pool.clone());
    let network = repo.find_by_id(id).await?.ok_or_else(not_found)?;

    let device_count = repo.count_devices(id).await?;
    if device_count > 0 {
        warn!(network_id = id, device_count, "Refusing to delete network with devices");
        return Err(ApiError::Conflict(format!(
            "Network {} still has {} device(s)",
            network.subnet, device_count
        )));
    }

    if repo.delete(id).await? == 0 {
        return Err(not_found());
    }

    info!(network_id = id, subnet = %network.subnet, "Network deleted");

    audit::record(
        &state.pool,
        &request_id,
        NewAuditEntry::new(
            AuditAction::NetworkDelete,
            format!("Deleted network {}", network.subnet),
        )
        .resource(id)
        .details(json!({ "subnet": network.subnet })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/networks/:id/recount
///
/// Recomputes the cached device counts from the devices table.
pub async fn recount_network(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecountResponse>, ApiError> {
    let counts = NetworkRepository::new(state.pool.clone())
        .update_device_counts(id)
        .await?
        .ok_or_else(not_found)?;

    monitoring::campus_counts(&state.pool).await?;

    info!(
        network_id = id,
        total_devices = counts.total,
        offline_devices = counts.offline,
        "Network recounted"
    );

    Ok(Json(RecountResponse {
        network_id: id,
        total_devices: counts.total,
        offline_devices: counts.offline,
    }))
}

/// GET /api/v1/networks/:id/devices
pub async fn list_network_devices(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Device>>, ApiError> {
    NetworkRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(not_found)?;

    let devices = DeviceRepository::new(state.pool.clone())
        .list_by_network(id)
        .await?
        .into_iter()
        .map(Device::from)
        .collect();

    Ok(Json(devices))
}
