//! Audit log listing.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use domain::models::audit_log::{ListAuditLogsQuery, ListAuditLogsResponse};
use domain::models::{AuditLog, ResourceType};
use persistence::repositories::AuditLogRepository;
use shared::pagination::{clamp_limit, Cursor};

use crate::app::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_audit_logs))
}

/// GET /api/v1/audit-logs?limit=&cursor=&resource_type=
///
/// Newest first. `next_cursor` is present only when another page exists.
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<ListAuditLogsQuery>,
) -> Result<Json<ListAuditLogsResponse>, ApiError> {
    let limit = clamp_limit(query.limit);
    let cursor = query.cursor.as_deref().map(Cursor::decode).transpose()?;
    let resource_type = query
        .resource_type
        .as_deref()
        .map(str::parse::<ResourceType>)
        .transpose()
        .map_err(ApiError::Validation)?
        .map(|r| r.to_string());

    let mut entries: Vec<AuditLog> = AuditLogRepository::new(state.pool.clone())
        .list(resource_type.as_deref(), cursor.as_ref(), limit + 1)
        .await?
        .into_iter()
        .map(AuditLog::from)
        .collect();

    let next_cursor = if entries.len() as i64 > limit {
        entries.truncate(limit as usize);
        entries
            .last()
            .map(|last| Cursor::new(last.created_at, last.id).encode())
    } else {
        None
    };

    Ok(Json(ListAuditLogsResponse {
        entries,
        next_cursor,
    }))
}
