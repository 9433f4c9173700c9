//! Audit trail writer.

use domain::models::NewAuditEntry;
use persistence::repositories::AuditLogRepository;
use sqlx::PgPool;
use tracing::warn;

use crate::middleware::RequestId;

/// Append an audit entry tagged with the current request ID.
///
/// The change being audited has already been committed, so a failed write is
/// logged and swallowed rather than turned into an error response.
pub async fn record(pool: &PgPool, request_id: &RequestId, entry: NewAuditEntry) {
    let entry = entry.request_id(request_id.as_str());
    let action = entry.action;

    if let Err(e) = AuditLogRepository::new(pool.clone()).insert(&entry).await {
        warn!(
            action = %action,
            request_id = %request_id.as_str(),
            error = %e,
            "Failed to write audit entry"
        );
    }
}
