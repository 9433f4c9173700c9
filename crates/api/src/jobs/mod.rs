//! Background jobs and the scheduler that runs them.

mod alert_evaluation;
mod pool_metrics;
mod refresh_network_counts;
mod rotate_activity;
mod scheduler;

pub use alert_evaluation::AlertEvaluationJob;
pub use pool_metrics::PoolMetricsJob;
pub use refresh_network_counts::RefreshNetworkCountsJob;
pub use rotate_activity::RotateActivityJob;
pub use scheduler::{Job, JobError, JobFrequency, JobScheduler};
