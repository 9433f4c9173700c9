//! Network repository for database operations.
//!
//! `total_devices` and `offline_devices` are a cache over the devices table.
//! They are only ever written by the recount statements below, each of which
//! recomputes both columns from the devices table in a single UPDATE.

use domain::models::DeviceCounts;
use sqlx::PgPool;

use crate::entities::{CampusCountsEntity, NetworkEntity};
use crate::metrics::{timed, QueryTimer};

/// Repository for network-related database operations.
#[derive(Clone)]
pub struct NetworkRepository {
    pool: PgPool,
}

impl NetworkRepository {
    /// Creates a new NetworkRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new network with zero counts.
    pub async fn create(&self, subnet: &str) -> Result<NetworkEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_network");
        let result = sqlx::query_as::<_, NetworkEntity>(
            r#"
            INSERT INTO networks (subnet)
            VALUES ($1)
            RETURNING *
            "#,
        )
        .bind(subnet)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find network by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<NetworkEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_network_by_id");
        let result = sqlx::query_as::<_, NetworkEntity>(
            r#"
            SELECT * FROM networks WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all networks ordered by subnet.
    pub async fn list(&self) -> Result<Vec<NetworkEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_networks");
        let result = sqlx::query_as::<_, NetworkEntity>(
            r#"
            SELECT * FROM networks ORDER BY subnet
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Networks linked to a building.
    pub async fn list_by_building(&self, building_id: i64) -> Result<Vec<NetworkEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_networks_by_building");
        let result = sqlx::query_as::<_, NetworkEntity>(
            r#"
            SELECT n.* FROM networks n
            JOIN building_networks bn ON bn.network_id = n.id
            WHERE bn.building_id = $1
            ORDER BY n.subnet
            "#,
        )
        .bind(building_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Change the subnet of a network.
    pub async fn update_subnet(&self, id: i64, subnet: &str) -> Result<Option<NetworkEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_network_subnet");
        let result = sqlx::query_as::<_, NetworkEntity>(
            r#"
            UPDATE networks SET subnet = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(subnet)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a network. Fails with a foreign-key violation while devices reference it.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_network");
        let result = sqlx::query(
            r#"
            DELETE FROM networks WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Number of devices currently in a network, read from the devices table.
    pub async fn count_devices(&self, id: i64) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_network_devices");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM devices WHERE network_id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0)
    }

    /// Recompute and store the counts of one network.
    ///
    /// Returns the stored counts, or `None` if the network does not exist.
    pub async fn update_device_counts(&self, id: i64) -> Result<Option<DeviceCounts>, sqlx::Error> {
        let row: Option<(i32, i32)> = timed(
            "update_network_device_counts",
            sqlx::query_as(
                r#"
                UPDATE networks n SET
                    total_devices = (
                        SELECT COUNT(*) FROM devices d WHERE d.network_id = n.id
                    ),
                    offline_devices = (
                        SELECT COUNT(*) FILTER (WHERE d.status = 'offline')
                        FROM devices d WHERE d.network_id = n.id
                    ),
                    updated_at = NOW()
                WHERE n.id = $1
                RETURNING n.total_devices, n.offline_devices
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(|(total, offline)| DeviceCounts::new(total.into(), offline.into())))
    }

    /// Recompute and store the counts of several networks. Each ID is recounted once.
    pub async fn update_device_counts_for(&self, ids: &[i64]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = timed(
            "update_network_device_counts_batch",
            sqlx::query(
                r#"
                UPDATE networks n SET
                    total_devices = (
                        SELECT COUNT(*) FROM devices d WHERE d.network_id = n.id
                    ),
                    offline_devices = (
                        SELECT COUNT(*) FILTER (WHERE d.status = 'offline')
                        FROM devices d WHERE d.network_id = n.id
                    ),
                    updated_at = NOW()
                WHERE n.id = ANY($1)
                "#,
            )
            .bind(ids)
            .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    /// Recompute and store the counts of every network.
    pub async fn update_all_device_counts(&self) -> Result<u64, sqlx::Error> {
        let result = timed(
            "update_all_network_device_counts",
            sqlx::query(
                r#"
                UPDATE networks n SET
                    total_devices = (
                        SELECT COUNT(*) FROM devices d WHERE d.network_id = n.id
                    ),
                    offline_devices = (
                        SELECT COUNT(*) FILTER (WHERE d.status = 'offline')
                        FROM devices d WHERE d.network_id = n.id
                    ),
                    updated_at = NOW()
                "#,
            )
            .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    /// Campus-wide totals summed over networks.
    pub async fn campus_counts(&self) -> Result<DeviceCounts, sqlx::Error> {
        let row = timed(
            "campus_device_counts",
            sqlx::query_as::<_, CampusCountsEntity>(
                r#"
                SELECT COALESCE(SUM(total_devices), 0)::BIGINT AS total_devices,
                       COALESCE(SUM(offline_devices), 0)::BIGINT AS offline_devices
                FROM networks
                "#,
            )
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(row.into())
    }
}
