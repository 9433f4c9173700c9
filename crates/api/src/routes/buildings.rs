//! Building routes.
//!
//! A building's totals are the sum of the cached counts of its networks.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use domain::models::building::{
    Building, BuildingDetail, BuildingStatus, CreateBuildingRequest, UpdateBuildingRequest,
};
use domain::models::network::NetworkResponse;
use domain::models::{AuditAction, NewAuditEntry, Network};
use persistence::repositories::{BuildingRepository, NetworkRepository};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::services::{audit, monitoring};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_buildings).post(create_building))
        .route(
            "/:id",
            get(get_building).put(update_building).delete(delete_building),
        )
        .route(
            "/:id/networks/:network_id",
            put(attach_network).delete(detach_network),
        )
}

/// GET /api/v1/buildings
pub async fn list_buildings(
    State(state): State<AppState>,
) -> Result<Json<Vec<BuildingStatus>>, ApiError> {
    let settings = state.settings().await;
    let statuses = monitoring::building_statuses(&state.pool, &settings).await?;
    Ok(Json(statuses))
}

/// GET /api/v1/buildings/:id
pub async fn get_building(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BuildingDetail>, ApiError> {
    let settings = state.settings().await;

    let status = BuildingRepository::new(state.pool.clone())
        .find_status(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Building not found".to_string()))?
        .into_status(&settings);

    let networks = NetworkRepository::new(state.pool.clone())
        .list_by_building(id)
        .await?
        .into_iter()
        .map(|n| NetworkResponse::new(Network::from(n), &settings))
        .collect();

    Ok(Json(BuildingDetail { status, networks }))
}

/// POST /api/v1/buildings
pub async fn create_building(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<CreateBuildingRequest>,
) -> Result<(StatusCode, Json<Building>), ApiError> {
    request.validate()?;

    let building: Building = BuildingRepository::new(state.pool.clone())
        .create(&request.name, request.map_x, request.map_y)
        .await?
        .into();

    info!(building_id = building.id, name = %building.name, "Building created");

    audit::record(
        &state.pool,
        &request_id,
        NewAuditEntry::new(
            AuditAction::BuildingCreate,
            format!("Created building {}", building.name),
        )
        .resource(building.id)
        .details(json!({ "map_x": building.map_x, "map_y": building.map_y })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(building)))
}

/// PUT /api/v1/buildings/:id
pub async fn update_building(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBuildingRequest>,
) -> Result<Json<Building>, ApiError> {
    request.validate()?;

    let building = BuildingRepository::new(state.pool.clone())
        .update(id, request.name.as_deref(), request.map_x, request.map_y)
        .await?
        .ok_or_else(|| ApiError::NotFound("Building not found".to_string()))?;

    info!(building_id = id, "Building updated");
    Ok(Json(building.into()))
}

/// DELETE /api/v1/buildings/:id
///
/// Networks linked to the building are unlinked, not deleted.
pub async fn delete_building(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = BuildingRepository::new(state.pool.clone());
    let building = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Building not found".to_string()))?;

    if repo.delete(id).await? == 0 {
        return Err(ApiError::NotFound("Building not found".to_string()));
    }

    info!(building_id = id, "Building deleted");

    audit::record(
        &state.pool,
        &request_id,
        NewAuditEntry::new(
            AuditAction::BuildingDelete,
            format!("Deleted building {}", building.name),
        )
        .resource(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/buildings/:id/networks/:network_id
pub async fn attach_network(
    State(state): State<AppState>,
    Path((id, network_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    // A missing building or network surfaces as a foreign-key violation (404).
    let created = BuildingRepository::new(state.pool.clone())
        .attach_network(id, network_id)
        .await?;

    info!(building_id = id, network_id, created, "Network attached to building");
    Ok(if created {
        StatusCode::CREATED
    } else {
        StatusCode::NO_CONTENT
    })
}

/// DELETE /api/v1/buildings/:id/networks/:network_id
pub async fn detach_network(
    State(state): State<AppState>,
    Path((id, network_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let removed = BuildingRepository::new(state.pool.clone())
        .detach_network(id, network_id)
        .await?;

    if removed == 0 {
        return Err(ApiError::NotFound(
            "Network is not attached to this building".to_string(),
        ));
    }

    info!(building_id = id, network_id, "Network detached from building");
    Ok(StatusCode::NO_CONTENT)
}
