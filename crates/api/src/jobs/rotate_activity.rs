//! Day rollover for device activity rows.

use chrono::Utc;
use persistence::repositories::DeviceActivityRepository;
use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobError, JobFrequency};

/// Demotes yesterday's day 1 rows to day 2 once the date changes.
///
/// Runs hourly; rows already dated today are left alone, so extra runs are
/// harmless.
pub struct RotateActivityJob {
    pool: PgPool,
}

impl RotateActivityJob {
    /// Create a new rotation job. It also runs once at startup.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for RotateActivityJob {
    fn name(&self) -> &'static str {
        "rotate_activity"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), JobError> {
        let summary = DeviceActivityRepository::new(self.pool.clone())
            .rotate_days(Utc::now().date_naive())
            .await?;

        if summary.demoted > 0 || summary.purged > 0 {
            info!(
                demoted = summary.demoted,
                purged = summary.purged,
                "Device activity rotated"
            );
        }
        Ok(())
    }
}
