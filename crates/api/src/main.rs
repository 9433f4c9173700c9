use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use domain::models::AlertSettings;
use persistence::repositories::AlertSettingsRepository;
use tracing::{info, warn};

use voip_monitor_api::app::{self, AppState};
use voip_monitor_api::config::Config;
use voip_monitor_api::jobs::{
    AlertEvaluationJob, JobScheduler, PoolMetricsJob, RefreshNetworkCountsJob, RotateActivityJob,
};
use voip_monitor_api::middleware;
use voip_monitor_api::services::LogAlertNotifier;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    middleware::logging::init_logging(&config.logging).context("Failed to initialise logging")?;
    middleware::init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting VoIP Monitor v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&(&config.database).into()).await?;

    info!("Running database migrations");
    persistence::db::run_migrations(&pool).await?;

    let alert_settings: AlertSettings = AlertSettingsRepository::new(pool.clone())
        .load_or_init(&config.alerts.to_settings())
        .await?
        .into();
    info!(
        lower_threshold = alert_settings.lower_threshold,
        upper_threshold = alert_settings.upper_threshold,
        is_active = alert_settings.is_active,
        "Alert settings loaded"
    );

    let addr = config.socket_addr()?;
    let state = AppState::new(config, pool, alert_settings);

    let mut scheduler = JobScheduler::new();
    let jobs = &state.config.jobs;
    if jobs.enabled {
        scheduler.register(RefreshNetworkCountsJob::new(
            state.pool.clone(),
            jobs.network_refresh_minutes,
        ));
        scheduler.register(RotateActivityJob::new(state.pool.clone()));
        scheduler.register(AlertEvaluationJob::new(
            state.pool.clone(),
            Arc::clone(&state.alert_settings),
            Arc::new(LogAlertNotifier),
            jobs.alert_evaluation_minutes,
        ));
        scheduler.register(PoolMetricsJob::new(
            state.pool.clone(),
            jobs.pool_metrics_secs,
        ));
        scheduler.start();
    } else {
        warn!("Background jobs disabled");
    }

    let router = app::router(state);

    info!(%addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
