//! Periodic recount of every network's cached device counts.
//!
//! Route handlers recount the networks they touch; this job repairs drift
//! from writes that bypass the API.

use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobError, JobFrequency};
use crate::services::monitoring;

/// Recounts every network on a fixed interval.
pub struct RefreshNetworkCountsJob {
    pool: PgPool,
    interval_minutes: u64,
}

impl RefreshNetworkCountsJob {
    pub fn new(pool: PgPool, interval_minutes: u64) -> Self {
        Self {
            pool,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for RefreshNetworkCountsJob {
    fn name(&self) -> &'static str {
        "refresh_network_counts"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), JobError> {
        let networks = monitoring::recount_all_networks(&self.pool).await?;
        info!(networks, "Network device counts refreshed");
        Ok(())
    }
}
