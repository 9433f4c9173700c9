//! Extension repository for database operations.

use sqlx::PgPool;

use crate::entities::ExtensionEntity;
use crate::metrics::QueryTimer;

/// Repository for extension-related database operations.
#[derive(Clone)]
pub struct ExtensionRepository {
    pool: PgPool,
}

impl ExtensionRepository {
    /// Creates a new ExtensionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new extension.
    pub async fn create(
        &self,
        extension_number: &str,
        user_first_name: &str,
        user_last_name: &str,
    ) -> Result<ExtensionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_extension");
        let result = sqlx::query_as::<_, ExtensionEntity>(
            r#"
            INSERT INTO extensions (extension_number, user_first_name, user_last_name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(extension_number)
        .bind(user_first_name)
        .bind(user_last_name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find extension by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ExtensionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_extension_by_id");
        let result = sqlx::query_as::<_, ExtensionEntity>(
            r#"
            SELECT * FROM extensions WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all extensions ordered by number.
    pub async fn list(&self) -> Result<Vec<ExtensionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_extensions");
        let result = sqlx::query_as::<_, ExtensionEntity>(
            r#"
            SELECT * FROM extensions ORDER BY extension_number
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Extensions registered on a device.
    pub async fn list_by_device(&self, device_id: i64) -> Result<Vec<ExtensionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_extensions_by_device");
        let result = sqlx::query_as::<_, ExtensionEntity>(
            r#"
            SELECT e.* FROM extensions e
            JOIN device_extensions de ON de.extension_id = e.id
            WHERE de.device_id = $1
            ORDER BY e.extension_number
            "#,
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update an extension. None values are preserved.
    pub async fn update(
        &self,
        id: i64,
        extension_number: Option<&str>,
        user_first_name: Option<&str>,
        user_last_name: Option<&str>,
    ) -> Result<Option<ExtensionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_extension");
        let result = sqlx::query_as::<_, ExtensionEntity>(
            r#"
            UPDATE extensions SET
                extension_number = COALESCE($2, extension_number),
                user_first_name = COALESCE($3, user_first_name),
                user_last_name = COALESCE($4, user_last_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(extension_number)
        .bind(user_first_name)
        .bind(user_last_name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an extension. Device registrations are removed by cascade.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_extension");
        let result = sqlx::query(
            r#"
            DELETE FROM extensions WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
