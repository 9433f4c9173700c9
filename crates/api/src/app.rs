use axum::{middleware, routing::get, Router};
use domain::models::AlertSettings;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{
    admin, alert_settings, audit_logs, buildings, dashboard, device_activity, devices,
    extensions, health, networks,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// In-memory copy of the alert settings row, replaced on every update.
    pub alert_settings: Arc<RwLock<AlertSettings>>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, alert_settings: AlertSettings) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            alert_settings: Arc::new(RwLock::new(alert_settings)),
        }
    }

    /// Snapshot of the current alert settings.
    pub async fn settings(&self) -> AlertSettings {
        self.alert_settings.read().await.clone()
    }
}

pub fn create_app(config: Config, pool: PgPool, alert_settings: AlertSettings) -> Router {
    router(AppState::new(config, pool, alert_settings))
}

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        .nest("/buildings", buildings::router())
        .nest("/networks", networks::router())
        .nest("/devices", devices::router().merge(device_activity::router()))
        .nest("/extensions", extensions::router())
        .nest("/alert-settings", alert_settings::router())
        .nest("/dashboard", dashboard::router())
        .nest("/audit-logs", audit_logs::router())
        .nest("/admin", admin::router());

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
