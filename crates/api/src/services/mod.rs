//! Application services shared by routes and jobs.

pub mod audit;
pub mod monitoring;
pub mod notifier;

pub use notifier::LogAlertNotifier;
