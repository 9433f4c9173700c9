//! Extension routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use domain::models::extension::{CreateExtensionRequest, UpdateExtensionRequest};
use domain::models::{AuditAction, Extension, NewAuditEntry};
use persistence::repositories::ExtensionRepository;
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::services::audit;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_extensions).post(create_extension))
        .route(
            "/:id",
            get(get_extension)
                .put(update_extension)
                .delete(delete_extension),
        )
}

fn not_found() -> ApiError {
    ApiError::NotFound("Extension not found".to_string())
}

/// GET /api/v1/extensions
pub async fn list_extensions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Extension>>, ApiError> {
    let extensions = ExtensionRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(Extension::from)
        .collect();
    Ok(Json(extensions))
}

/// GET /api/v1/extensions/:id
pub async fn get_extension(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Extension>, ApiError> {
    let extension = ExtensionRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(extension.into()))
}

/// POST /api/v1/extensions
pub async fn create_extension(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<CreateExtensionRequest>,
) -> Result<(StatusCode, Json<Extension>), ApiError> {
    request.validate()?;

    let extension: Extension = ExtensionRepository::new(state.pool.clone())
        .create(
            &request.extension_number,
            &request.user_first_name,
            &request.user_last_name,
        )
        .await?
        .into();

    info!(
        extension_id = extension.id,
        extension_number = %extension.extension_number,
        "Extension created"
    );

    audit::record(
        &state.pool,
        &request_id,
        NewAuditEntry::new(
            AuditAction::ExtensionCreate,
            format!(
                "Created extension {} for {}",
                extension.extension_number,
                extension.user_full_name()
            ),
        )
        .resource(extension.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(extension)))
}

/// PUT /api/v1/extensions/:id
pub async fn update_extension(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateExtensionRequest>,
) -> Result<Json<Extension>, ApiError> {
    request.validate()?;

    let extension: Extension = ExtensionRepository::new(state.pool.clone())
        .update(
            id,
            request.extension_number.as_deref(),
            request.user_first_name.as_deref(),
            request.user_last_name.as_deref(),
        )
        .await?
        .ok_or_else(not_found)?
        .into();

    info!(extension_id = id, "Extension updated");

    Ok(Json(extension))
}

/// DELETE /api/v1/extensions/:id
pub async fn delete_extension(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = ExtensionRepository::new(state.pool.clone());
    let extension = repo.find_by_id(id).await?.ok_or_else(not_found)?;

    if repo.delete(id).await? == 0 {
        return Err(not_found());
    }

    info!(extension_id = id, "Extension deleted");

    audit::record(
        &state.pool,
        &request_id,
        NewAuditEntry::new(
            AuditAction::ExtensionDelete,
            format!("Deleted extension {}", extension.extension_number),
        )
        .resource(id)
        .details(json!({ "devices_registered": extension.devices_registered })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
