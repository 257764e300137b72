//! Health check endpoint handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use std::time::Instant;

use persistence::metrics::record_pool_metrics;

use crate::app::AppState;
use crate::error::ApiError;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
}

/// Database health status.
#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
    pub pool_size: u32,
    pub pool_idle: usize,
}

/// Simple status response for the liveness and readiness checks.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

async fn database_reachable(state: &AppState) -> bool {
    sqlx::query("SELECT 1").execute(&state.pool).await.is_ok()
}

fn database_unavailable() -> ApiError {
    ApiError::ServiceUnavailable("Database unavailable".into())
}

/// Full health check endpoint.
///
/// Reports database connectivity and pool usage; also refreshes the pool gauges.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let start = Instant::now();
    let db_connected = database_reachable(&state).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    record_pool_metrics(&state.pool);

    if !db_connected {
        return Err(database_unavailable());
    }

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: true,
            latency_ms: Some(latency_ms),
            pool_size: state.pool.size(),
            pool_idle: state.pool.num_idle(),
        },
    }))
}

/// Liveness endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness endpoint.
///
/// Returns 200 OK if the service can accept traffic (database connected).
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    if database_reachable(&state).await {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(database_unavailable())
    }
}
