//! Health and probe endpoints. These sit outside `/api/v1`.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
    pub alerting_active: bool,
    pub jobs_enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: &'static str,
}

/// Round-trip latency of a trivial query, or `None` when it fails.
async fn probe_database(pool: &PgPool) -> Option<u64> {
    let start = Instant::now();
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .ok()
        .map(|_| start.elapsed().as_millis() as u64)
}

/// GET /api/health
///
/// 503 with the same body shape when the database is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let latency_ms = probe_database(&state.pool).await;
    let connected = latency_ms.is_some();

    let body = HealthResponse {
        status: if connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            connected,
            latency_ms,
        },
        alerting_active: state.settings().await.is_active,
        jobs_enabled: state.config.jobs.enabled,
    };

    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

/// GET /api/health/live
pub async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse { status: "alive" })
}

/// GET /api/health/ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ProbeResponse>) {
    match probe_database(&state.pool).await {
        Some(_) => (StatusCode::OK, Json(ProbeResponse { status: "ready" })),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse {
                status: "unavailable",
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_database_omits_latency() {
        let response = HealthResponse {
            status: "degraded",
            version: "0.3.0",
            database: DatabaseHealth {
                connected: false,
                latency_ms: None,
            },
            alerting_active: true,
            jobs_enabled: false,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["database"]["connected"], false);
        assert!(json["database"].get("latency_ms").is_none());
        assert_eq!(json["alerting_active"], true);
    }

    #[tokio::test]
    async fn test_live() {
        let Json(response) = live().await;
        assert_eq!(response.status, "alive");
    }
}
