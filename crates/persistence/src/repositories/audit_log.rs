//! Audit log repository for database operations.

use domain::models::NewAuditEntry;
use shared::pagination::Cursor;
use sqlx::PgPool;

use crate::entities::AuditLogEntity;
use crate::metrics::QueryTimer;

/// Repository for the append-only audit trail.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    pub async fn insert(&self, entry: &NewAuditEntry) -> Result<AuditLogEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_audit_log");
        let result = sqlx::query_as::<_, AuditLogEntity>(
            r#"
            INSERT INTO audit_logs (action, resource_type, resource_id, summary, details, request_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(entry.action.to_string())
        .bind(entry.action.resource_type().to_string())
        .bind(entry.resource_id.as_deref())
        .bind(&entry.summary)
        .bind(entry.details.as_ref())
        .bind(entry.request_id.as_deref())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Entries newest first, strictly after `cursor` in that order.
    pub async fn list(
        &self,
        resource_type: Option<&str>,
        cursor: Option<&Cursor>,
        limit: i64,
    ) -> Result<Vec<AuditLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_audit_logs");
        let result = sqlx::query_as::<_, AuditLogEntity>(
            r#"
            SELECT * FROM audit_logs
            WHERE ($1::TEXT IS NULL OR resource_type = $1)
              AND ($2::TIMESTAMPTZ IS NULL OR (created_at, id) < ($2, $3))
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(resource_type)
        .bind(cursor.map(|c| c.created_at))
        .bind(cursor.map(|c| c.id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
