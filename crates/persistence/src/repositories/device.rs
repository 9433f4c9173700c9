//! Device repository for database operations.

use std::collections::HashMap;

use domain::models::DeviceStatus;
use sqlx::PgPool;

use crate::entities::DeviceEntity;
use crate::metrics::QueryTimer;

/// Optional filters for listing devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceFilter {
    pub network_id: Option<i64>,
    pub status: Option<DeviceStatus>,
    pub is_critical: Option<bool>,
}

/// Repository for device-related database operations.
///
/// Write methods here do not touch the cached network counts; callers recount
/// the affected networks through `NetworkRepository`.
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new device.
    pub async fn create(
        &self,
        mac_address: &str,
        ip_address: &str,
        network_id: i64,
        status: DeviceStatus,
        is_critical: bool,
        owner: Option<&str>,
    ) -> Result<DeviceEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_device");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            INSERT INTO devices (mac_address, ip_address, network_id, status, is_critical, owner)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(mac_address)
        .bind(ip_address)
        .bind(network_id)
        .bind(status.as_str())
        .bind(is_critical)
        .bind(owner)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find device by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_device_by_id");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT * FROM devices WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List devices matching `filter`, ordered by IP address.
    pub async fn list(
        &self,
        filter: &DeviceFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_devices");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT * FROM devices
            WHERE ($1::BIGINT IS NULL OR network_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::BOOLEAN IS NULL OR is_critical = $3)
            ORDER BY ip_address, id
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.network_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.is_critical)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count devices matching `filter`.
    pub async fn count(&self, filter: &DeviceFilter) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_devices");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM devices
            WHERE ($1::BIGINT IS NULL OR network_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::BOOLEAN IS NULL OR is_critical = $3)
            "#,
        )
        .bind(filter.network_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.is_critical)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0)
    }

    /// Every device in a network, ordered by IP address.
    pub async fn list_by_network(&self, network_id: i64) -> Result<Vec<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_devices_by_network");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT * FROM devices WHERE network_id = $1
            ORDER BY ip_address, id
            "#,
        )
        .bind(network_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// IP addresses of every device in a network.
    pub async fn ip_addresses_in_network(&self, network_id: i64) -> Result<Vec<String>, sqlx::Error> {
        let timer = QueryTimer::new("list_device_ips_by_network");
        let result = sqlx::query_scalar(
            r#"
            SELECT ip_address FROM devices WHERE network_id = $1
            "#,
        )
        .bind(network_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update device attributes. None values are preserved.
    pub async fn update(
        &self,
        id: i64,
        mac_address: Option<&str>,
        ip_address: Option<&str>,
        network_id: Option<i64>,
        is_critical: Option<bool>,
        owner: Option<&str>,
    ) -> Result<Option<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_device");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            UPDATE devices SET
                mac_address = COALESCE($2, mac_address),
                ip_address = COALESCE($3, ip_address),
                network_id = COALESCE($4, network_id),
                is_critical = COALESCE($5, is_critical),
                owner = COALESCE($6, owner),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(mac_address)
        .bind(ip_address)
        .bind(network_id)
        .bind(is_critical)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Set the status of one device.
    pub async fn set_status(
        &self,
        id: i64,
        status: DeviceStatus,
    ) -> Result<Option<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_device_status");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            UPDATE devices SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply statuses by IP address in one statement.
    ///
    /// When an IP appears more than once the last entry wins. Returns the
    /// updated rows; IPs with no matching device are absent from the result.
    pub async fn set_status_by_ip(
        &self,
        updates: &[(String, DeviceStatus)],
    ) -> Result<Vec<DeviceEntity>, sqlx::Error> {
        let mut latest: HashMap<&str, DeviceStatus> = HashMap::with_capacity(updates.len());
        for (ip, status) in updates {
            latest.insert(ip.as_str(), *status);
        }
        let (ips, statuses): (Vec<String>, Vec<String>) = latest
            .into_iter()
            .map(|(ip, s)| (ip.to_string(), s.as_str().to_string()))
            .unzip();

        let timer = QueryTimer::new("set_device_status_by_ip");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            UPDATE devices d SET status = u.status, updated_at = NOW()
            FROM UNNEST($1::TEXT[], $2::TEXT[]) AS u(ip_address, status)
            WHERE d.ip_address = u.ip_address
            RETURNING d.*
            "#,
        )
        .bind(ips)
        .bind(statuses)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a device and refresh `devices_registered` on its extensions.
    pub async fn delete(&self, id: i64) -> Result<Option<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("delete_device");
        let mut tx = self.pool.begin().await?;

        let extension_ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT extension_id FROM device_extensions WHERE device_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let deleted = sqlx::query_as::<_, DeviceEntity>(
            r#"
            DELETE FROM devices WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if !extension_ids.is_empty() {
            refresh_extension_counts(&mut tx, Some(extension_ids.as_slice())).await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(deleted)
    }

    /// Delete every offline device that is not critical.
    ///
    /// Returns the distinct network IDs that lost devices.
    pub async fn delete_offline_non_critical(&self) -> Result<(u64, Vec<i64>), sqlx::Error> {
        let timer = QueryTimer::new("delete_offline_non_critical_devices");
        let mut tx = self.pool.begin().await?;

        let mut network_ids: Vec<i64> = sqlx::query_scalar(
            r#"
            DELETE FROM devices
            WHERE status = 'offline' AND is_critical = FALSE
            RETURNING network_id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;
        let deleted = network_ids.len() as u64;
        network_ids.sort_unstable();
        network_ids.dedup();

        if deleted > 0 {
            refresh_extension_counts(&mut tx, None).await?;
        }

        tx.commit().await?;
        timer.record();
        Ok((deleted, network_ids))
    }

    /// Offline devices flagged as critical.
    pub async fn find_offline_critical(&self) -> Result<Vec<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_offline_critical_devices");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT * FROM devices
            WHERE is_critical = TRUE AND status = 'offline'
            ORDER BY ip_address
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Register an extension on a device. Returns false if already registered.
    pub async fn attach_extension(&self, device_id: i64, extension_id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("attach_device_extension");
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO device_extensions (device_id, extension_id)
            VALUES ($1, $2)
            ON CONFLICT (device_id, extension_id) DO NOTHING
            "#,
        )
        .bind(device_id)
        .bind(extension_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        refresh_extension_counts(&mut tx, Some(std::slice::from_ref(&extension_id))).await?;
        tx.commit().await?;
        timer.record();
        Ok(inserted > 0)
    }

    /// Remove an extension from a device.
    pub async fn detach_extension(&self, device_id: i64, extension_id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("detach_device_extension");
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM device_extensions
            WHERE device_id = $1 AND extension_id = $2
            "#,
        )
        .bind(device_id)
        .bind(extension_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        refresh_extension_counts(&mut tx, Some(std::slice::from_ref(&extension_id))).await?;
        tx.commit().await?;
        timer.record();
        Ok(removed)
    }
}

/// Recompute `devices_registered` for the given extensions, or all of them.
async fn refresh_extension_counts(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    extension_ids: Option<&[i64]>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE extensions e SET
            devices_registered = (
                SELECT COUNT(*) FROM device_extensions de WHERE de.extension_id = e.id
            ),
            updated_at = NOW()
        WHERE $1::BIGINT[] IS NULL OR e.id = ANY($1)
        "#,
    )
    .bind(extension_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
