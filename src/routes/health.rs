use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use diesel::RunQueryDsl;
use serde::Serialize;
use std::sync::Arc;

use crate::{AppState, db::models::ApiResponse};

#[derive(Serialize, Debug, PartialEq)]
pub struct HealthStatus {
    pub database: bool,
    pub redis: bool,
    pub websocket_connections: usize,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.database && self.redis
    }
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match state.db.get() {
        Ok(mut conn) => diesel::sql_query("SELECT 1").execute(&mut conn).is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not get a database connection");
            false
        }
    };
    let redis = match state.auth_cache.health_check().await {
        Ok(up) => up,
        Err(e) => {
            tracing::warn!(error = %e, "Redis health check failed");
            false
        }
    };
    let status = HealthStatus {
        database,
        redis,
        websocket_connections: state.ws.connection_count().await,
    };

    if status.is_healthy() {
        (StatusCode::OK, Json(ApiResponse::success(status, "Service is healthy")))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::unavailable(status, "Service is degraded")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_both_stores() {
        let mut status = HealthStatus {
            database: true,
            redis: true,
            websocket_connections: 0,
        };
        assert!(status.is_healthy());
        status.redis = false;
        assert!(!status.is_healthy());
        status.redis = true;
        status.database = false;
        assert!(!status.is_healthy());
    }
}
