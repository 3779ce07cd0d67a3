use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::cache::redis::ping;
use crate::db::models::api::ApiResponse;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
    pub redis: &'static str,
    pub version: &'static str,
}

/// 存活检查：依赖故障只降级状态，仍返回 200
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let redis = match ping(&state.redis).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!("Health check: redis unavailable: {}", e);
            "unavailable"
        }
    };
    let database = match state.db.get() {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("Health check: database unavailable: {}", e);
            "unavailable"
        }
    };

    let status = HealthStatus {
        status: if redis == "ok" && database == "ok" { "ok" } else { "degraded" },
        database,
        redis,
        version: env!("CARGO_PKG_VERSION"),
    };
    (StatusCode::OK, Json(ApiResponse::success(status, "Service is running"))).into_response()
}
