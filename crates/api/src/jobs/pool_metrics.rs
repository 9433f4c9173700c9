//! Connection pool gauges.

use sqlx::PgPool;

use super::scheduler::{Job, JobError, JobFrequency};

/// Records the `database_connections_*` gauges.
pub struct PoolMetricsJob {
    pool: PgPool,
    interval_secs: u64,
}

impl PoolMetricsJob {
    /// Samples `pool` every `interval_secs` seconds.
    pub fn new(pool: PgPool, interval_secs: u64) -> Self {
        Self {
            pool,
            interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), JobError> {
        persistence::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }
}
