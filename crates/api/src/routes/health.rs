//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub ok: bool,
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub services: ServicesHealth,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Whether the optional integrations are configured. Nothing is called.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ServicesHealth {
    pub email: bool,
    pub ai: bool,
}

/// Simple status response for liveness/readiness checks.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub status: String,
}

/// GET /api/health
///
/// Database connectivity plus the configuration state of email and AI.
/// Responds 503 with the same body when the database is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();
    let db_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let latency_ms = start.elapsed().as_millis() as u64;

    let response = HealthResponse {
        ok: db_connected,
        status: if db_connected { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: db_connected,
            latency_ms: if db_connected { Some(latency_ms) } else { None },
        },
        services: ServicesHealth {
            email: state.email.is_configured(),
            ai: state.ai.is_configured(),
        },
    };

    let status = if db_connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// GET /api/health/live
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        ok: true,
        status: "alive".to_string(),
    })
}

/// GET /api/health/ready
///
/// 200 once the database answers.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    if sqlx::query("SELECT 1").execute(&state.pool).await.is_ok() {
        (
            StatusCode::OK,
            Json(StatusResponse {
                ok: true,
                status: "ready".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusResponse {
                ok: false,
                status: "unavailable".to_string(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serializes_services() {
        let response = HealthResponse {
            ok: true,
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            database: DatabaseHealth {
                connected: true,
                latency_ms: Some(5),
            },
            services: ServicesHealth {
                email: true,
                ai: false,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["database"]["latency_ms"], 5);
        assert_eq!(json["services"]["email"], true);
        assert_eq!(json["services"]["ai"], false);
    }

    #[test]
    fn test_unhealthy_omits_latency() {
        let response = HealthResponse {
            ok: false,
            status: "unhealthy".to_string(),
            version: "0.1.0".to_string(),
            database: DatabaseHealth {
                connected: false,
                latency_ms: None,
            },
            services: ServicesHealth {
                email: false,
                ai: false,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert!(json["database"]["latency_ms"].is_null());
    }

    #[tokio::test]
    async fn test_live() {
        let Json(body) = live().await;
        assert!(body.ok);
        assert_eq!(body.status, "alive");
    }
}
