//! Aggregation helpers shared by the dashboard, building routes and jobs.

use domain::models::{AlertSettings, BuildingStatus, DeviceCounts};
use persistence::repositories::{BuildingRepository, NetworkRepository};
use sqlx::PgPool;

use crate::middleware::metrics::record_devices_offline;

/// Every building with summed network counts, classified under `settings`.
pub async fn building_statuses(
    pool: &PgPool,
    settings: &AlertSettings,
) -> Result<Vec<BuildingStatus>, sqlx::Error> {
    let rows = BuildingRepository::new(pool.clone()).list_statuses().await?;
    Ok(rows.into_iter().map(|r| r.into_status(settings)).collect())
}

/// Campus totals, also published as the offline gauge.
pub async fn campus_counts(pool: &PgPool) -> Result<DeviceCounts, sqlx::Error> {
    let counts = NetworkRepository::new(pool.clone()).campus_counts().await?;
    record_devices_offline(counts.offline);
    Ok(counts)
}

/// Recount the given networks once each, then refresh the offline gauge.
pub async fn recount_networks(pool: &PgPool, network_ids: &[i64]) -> Result<u64, sqlx::Error> {
    let mut ids = network_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let updated = NetworkRepository::new(pool.clone())
        .update_device_counts_for(&ids)
        .await?;
    campus_counts(pool).await?;
    Ok(updated)
}

/// Recount every network, then refresh the offline gauge.
pub async fn recount_all_networks(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let updated = NetworkRepository::new(pool.clone())
        .update_all_device_counts()
        .await?;
    campus_counts(pool).await?;
    Ok(updated)
}
