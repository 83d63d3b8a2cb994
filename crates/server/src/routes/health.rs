//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::gateway::Gateway;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Check that the upstream FHIR server answers its capability statement
pub async fn check(State(gateway): State<Gateway>) -> impl IntoResponse {
    match gateway.upstream_status().await {
        Ok(status) if status.is_success() => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                reason: None,
            }),
        ),
        Ok(status) => {
            tracing::error!(status = %status, "Health check: upstream metadata not available");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    reason: Some(format!("FHIR server answered {}", status)),
                }),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Health check: upstream unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    reason: Some(format!("FHIR server unreachable: {}", e)),
                }),
            )
        }
    }
}
