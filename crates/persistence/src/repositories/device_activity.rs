//! Device activity repository for database operations.
//!
//! Each device has at most two rows: day 1 (today) and day 2 (yesterday).
//! Rotation demotes day 1 to day 2 once its date is in the past.

use chrono::{Duration, NaiveDate};
use domain::models::{ActivityDay, DeviceActivity, SampleError};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

use crate::entities::DeviceActivityEntity;
use crate::metrics::QueryTimer;

/// Failure while writing a sample.
#[derive(Debug, Error)]
pub enum ActivityWriteError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Rows affected by one rotation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationSummary {
    pub demoted: u64,
    pub purged: u64,
}

/// Repository for device activity rows.
#[derive(Clone)]
pub struct DeviceActivityRepository {
    pool: PgPool,
}

impl DeviceActivityRepository {
    /// Creates a new DeviceActivityRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read one day of a device as seen from `today`.
    ///
    /// Rows are matched on date, so a day 1 row not yet rotated past midnight
    /// is served as yesterday and never as today.
    pub async fn find(
        &self,
        device_id: i64,
        day: ActivityDay,
        today: NaiveDate,
    ) -> Result<Option<DeviceActivityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_device_activity");
        let result = sqlx::query_as::<_, DeviceActivityEntity>(
            r#"
            SELECT * FROM device_activity
            WHERE device_id = $1 AND activity_date = $2
            ORDER BY day_number
            LIMIT 1
            "#,
        )
        .bind(device_id)
        .bind(day.date_for(today))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Write one sample into the device's row for `today`.
    ///
    /// The row is locked for the duration of the read-modify-write, so
    /// concurrent writers to the same device serialise. A day 1 row left over
    /// from an earlier date is rotated out first.
    pub async fn set_sample(
        &self,
        device_id: i64,
        today: NaiveDate,
        index: usize,
        status: i32,
    ) -> Result<DeviceActivity, ActivityWriteError> {
        let timer = QueryTimer::new("set_device_activity_sample");
        let mut tx = self.pool.begin().await?;

        let mut row = lock_or_create_today(&mut tx, device_id, today).await?;
        if row.activity_date < today {
            rotate_device(&mut tx, &row, today).await?;
            row = lock_or_create_today(&mut tx, device_id, today).await?;
        }

        let mut activity = DeviceActivity::try_from(row)?;
        activity.set_sample_status(index, status)?;

        sqlx::query(
            r#"
            UPDATE device_activity SET samples = $3, updated_at = NOW()
            WHERE device_id = $1 AND day_number = $2
            "#,
        )
        .bind(device_id)
        .bind(ActivityDay::Today.day_number())
        .bind(activity.samples.clone().map(Json))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(activity)
    }

    /// Rotate every device whose day 1 row is dated before `today`.
    ///
    /// Day 2 rows of those devices are dropped and their day 1 rows become
    /// day 2. Day 2 rows older than yesterday are purged.
    pub async fn rotate_days(&self, today: NaiveDate) -> Result<RotationSummary, sqlx::Error> {
        let timer = QueryTimer::new("rotate_device_activity");
        let yesterday = today - Duration::days(1);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM device_activity
            WHERE day_number = 2
              AND device_id IN (
                  SELECT device_id FROM device_activity
                  WHERE day_number = 1 AND activity_date < $1
              )
            "#,
        )
        .bind(today)
        .execute(&mut *tx)
        .await?;

        let demoted = sqlx::query(
            r#"
            UPDATE device_activity SET day_number = 2, updated_at = NOW()
            WHERE day_number = 1 AND activity_date < $1
            "#,
        )
        .bind(today)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let purged = sqlx::query(
            r#"
            DELETE FROM device_activity
            WHERE day_number = 2 AND activity_date < $1
            "#,
        )
        .bind(yesterday)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        timer.record();
        tracing::debug!(demoted, purged, %today, "Rotated device activity");
        Ok(RotationSummary { demoted, purged })
    }
}

/// Attempts at creating and locking the day 1 row before giving up.
const LOCK_ATTEMPTS: usize = 3;

/// Lock the device's day 1 row, creating it for `today` when absent.
///
/// A concurrent rotation can demote the row between the insert and the lock.
/// The lock then matches nothing and the insert is retried, which creates a
/// fresh day 1 row.
async fn lock_or_create_today(
    tx: &mut Transaction<'_, Postgres>,
    device_id: i64,
    today: NaiveDate,
) -> Result<DeviceActivityEntity, sqlx::Error> {
    for _ in 0..LOCK_ATTEMPTS {
        sqlx::query(
            r#"
            INSERT INTO device_activity (device_id, activity_date, day_number)
            VALUES ($1, $2, 1)
            ON CONFLICT (device_id, day_number) DO NOTHING
            "#,
        )
        .bind(device_id)
        .bind(today)
        .execute(&mut **tx)
        .await?;

        let row = sqlx::query_as::<_, DeviceActivityEntity>(
            r#"
            SELECT * FROM device_activity
            WHERE device_id = $1 AND day_number = 1
            FOR UPDATE
            "#,
        )
        .bind(device_id)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(row) = row {
            return Ok(row);
        }
        tracing::debug!(device_id, "Day 1 activity row moved before lock, retrying");
    }
    Err(sqlx::Error::RowNotFound)
}

/// Demote a stale day 1 row for one device and start a fresh day.
///
/// A row older than yesterday carries nothing worth keeping and is reset in
/// place instead of demoted.
async fn rotate_device(
    tx: &mut Transaction<'_, Postgres>,
    stale: &DeviceActivityEntity,
    today: NaiveDate,
) -> Result<(), sqlx::Error> {
    let yesterday = today - Duration::days(1);

    sqlx::query(
        r#"
        DELETE FROM device_activity WHERE device_id = $1 AND day_number = 2
        "#,
    )
    .bind(stale.device_id)
    .execute(&mut **tx)
    .await?;

    if stale.activity_date == yesterday {
        sqlx::query(
            r#"
            UPDATE device_activity SET day_number = 2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(stale.id)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO device_activity (device_id, activity_date, day_number)
            VALUES ($1, $2, 1)
            "#,
        )
        .bind(stale.device_id)
        .bind(today)
        .execute(&mut **tx)
        .await?;
    } else {
        sqlx::query(
            r#"
            UPDATE device_activity SET activity_date = $2, samples = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(stale.id)
        .bind(today)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
