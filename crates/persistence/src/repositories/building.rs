//! Building repository for database operations.

use sqlx::PgPool;

use crate::entities::{BuildingEntity, BuildingStatusEntity};
use crate::metrics::QueryTimer;

/// Repository for building-related database operations.
#[derive(Clone)]
pub struct BuildingRepository {
    pool: PgPool,
}

impl BuildingRepository {
    /// Creates a new BuildingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new building.
    pub async fn create(
        &self,
        name: &str,
        map_x: f64,
        map_y: f64,
    ) -> Result<BuildingEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_building");
        let result = sqlx::query_as::<_, BuildingEntity>(
            r#"
            INSERT INTO buildings (name, map_x, map_y)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(map_x)
        .bind(map_y)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find building by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<BuildingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_building_by_id");
        let result = sqlx::query_as::<_, BuildingEntity>(
            r#"
            SELECT * FROM buildings WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update a building. None values are preserved.
    pub async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        map_x: Option<f64>,
        map_y: Option<f64>,
    ) -> Result<Option<BuildingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_building");
        let result = sqlx::query_as::<_, BuildingEntity>(
            r#"
            UPDATE buildings SET
                name = COALESCE($2, name),
                map_x = COALESCE($3, map_x),
                map_y = COALESCE($4, map_y),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(map_x)
        .bind(map_y)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a building. Network links are removed by cascade; networks survive.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_building");
        let result = sqlx::query(
            r#"
            DELETE FROM buildings WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Link a network to a building. Returns false if already linked.
    pub async fn attach_network(&self, building_id: i64, network_id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("attach_building_network");
        let result = sqlx::query(
            r#"
            INSERT INTO building_networks (building_id, network_id)
            VALUES ($1, $2)
            ON CONFLICT (building_id, network_id) DO NOTHING
            "#,
        )
        .bind(building_id)
        .bind(network_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Unlink a network from a building.
    pub async fn detach_network(&self, building_id: i64, network_id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("detach_building_network");
        let result = sqlx::query(
            r#"
            DELETE FROM building_networks
            WHERE building_id = $1 AND network_id = $2
            "#,
        )
        .bind(building_id)
        .bind(network_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// All buildings with the summed cached counts of their networks.
    pub async fn list_statuses(&self) -> Result<Vec<BuildingStatusEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_building_statuses");
        let result = sqlx::query_as::<_, BuildingStatusEntity>(
            r#"
            SELECT b.id, b.name, b.map_x, b.map_y, b.created_at, b.updated_at,
                   COUNT(n.id) AS network_count,
                   COALESCE(SUM(n.total_devices), 0)::BIGINT AS total_devices,
                   COALESCE(SUM(n.offline_devices), 0)::BIGINT AS offline_devices
            FROM buildings b
            LEFT JOIN building_networks bn ON bn.building_id = b.id
            LEFT JOIN networks n ON n.id = bn.network_id
            GROUP BY b.id
            ORDER BY b.name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// One building with its summed network counts.
    pub async fn find_status(&self, id: i64) -> Result<Option<BuildingStatusEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_building_status");
        let result = sqlx::query_as::<_, BuildingStatusEntity>(
            r#"
            SELECT b.id, b.name, b.map_x, b.map_y, b.created_at, b.updated_at,
                   COUNT(n.id) AS network_count,
                   COALESCE(SUM(n.total_devices), 0)::BIGINT AS total_devices,
                   COALESCE(SUM(n.offline_devices), 0)::BIGINT AS offline_devices
            FROM buildings b
            LEFT JOIN building_networks bn ON bn.building_id = b.id
            LEFT JOIN networks n ON n.id = bn.network_id
            WHERE b.id = $1
            GROUP BY b.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
