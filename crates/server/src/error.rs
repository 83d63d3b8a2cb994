//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::gateway::GatewayError;
use crate::upstream::TransportError;

/// Application error type, rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Upstream { status: StatusCode, message: String },
    BadGateway(String),
    GatewayTimeout(String),
    Internal(String),
}

/// Caller-facing wording for one route's failures
pub struct ErrorMessages {
    pub not_found: &'static str,
    pub upstream: &'static str,
    pub malformed: &'static str,
    pub missing_location: &'static str,
    /// Pass the upstream's error status through; otherwise answer 500
    pub propagate_upstream_status: bool,
}

impl AppError {
    /// Map a gateway failure onto an HTTP error using the route's wording
    pub fn from_gateway(err: GatewayError, messages: &ErrorMessages) -> Self {
        match err {
            GatewayError::ClientError(msg) => AppError::BadRequest(msg),
            GatewayError::UpstreamUnavailable(TransportError::Timeout(_)) => {
                AppError::GatewayTimeout("The FHIR server did not respond in time".to_string())
            }
            GatewayError::UpstreamUnavailable(_) => {
                AppError::BadGateway("The FHIR server is unreachable".to_string())
            }
            GatewayError::ResourceNotFound(_) => AppError::NotFound(messages.not_found.to_string()),
            GatewayError::UpstreamError { status } => {
                if !messages.propagate_upstream_status {
                    AppError::Internal(messages.upstream.to_string())
                } else if status.is_client_error() || status.is_server_error() {
                    AppError::Upstream {
                        status,
                        message: messages.upstream.to_string(),
                    }
                } else {
                    // a 2xx/3xx that is not the expected one is not an error code we can echo
                    AppError::BadGateway(messages.upstream.to_string())
                }
            }
            GatewayError::MissingLocation => {
                AppError::Internal(messages.missing_location.to_string())
            }
            GatewayError::MalformedResponse(_) => AppError::Internal(messages.malformed.to_string()),
            GatewayError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal gateway error");
                AppError::Internal("Internal server error".to_string())
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => *status,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Upstream { message: msg, .. }
            | AppError::BadGateway(msg)
            | AppError::GatewayTimeout(msg)
            | AppError::Internal(msg) => msg,
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGES: ErrorMessages = ErrorMessages {
        not_found: "Patient not found",
        upstream: "An error occurred",
        malformed: "Bad upstream body",
        missing_location: "No location",
        propagate_upstream_status: true,
    };

    #[test]
    fn test_upstream_status_passthrough() {
        let err = AppError::from_gateway(
            GatewayError::UpstreamError {
                status: StatusCode::FORBIDDEN,
            },
            &MESSAGES,
        );
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err = AppError::from_gateway(
            GatewayError::UpstreamError {
                status: StatusCode::OK,
            },
            &MESSAGES,
        );
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_upstream_status_masked() {
        let messages = ErrorMessages {
            propagate_upstream_status: false,
            ..MESSAGES
        };
        let err = AppError::from_gateway(
            GatewayError::UpstreamError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
            },
            &messages,
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_contract_breaches_are_500() {
        let err = AppError::from_gateway(GatewayError::MissingLocation, &MESSAGES);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from_gateway(
            GatewayError::MalformedResponse(decode.into()),
            &MESSAGES,
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_and_bad_request() {
        let err = AppError::from_gateway(
            GatewayError::ResourceNotFound("Patient/42".into()),
            &MESSAGES,
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = AppError::from_gateway(GatewayError::ClientError("bad".into()), &MESSAGES);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
