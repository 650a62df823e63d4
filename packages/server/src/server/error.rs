//! API error taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::domains::auth::OtpError;

/// Error taxonomy for the HTTP surface.
///
/// Every variant maps to a stable status class; upstream failures are
/// logged and surfaced with a generic body, never leaking internals.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    Conflict(String),

    #[error("Please wait {wait_secs} seconds before requesting a new OTP.")]
    RateLimited { wait_secs: u64 },

    #[error("Internal server error")]
    Upstream(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(source) => {
                error!(error = %source, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorBody {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let detail = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let codes = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: {}", field, codes)
            })
            .collect::<Vec<_>>()
            .join("; ");
        ApiError::Validation(detail)
    }
}

impl From<OtpError> for ApiError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::CooldownActive { wait_secs } => ApiError::RateLimited { wait_secs },
            OtpError::Delivery(source) => ApiError::Upstream(source.context("OTP delivery failed")),
            OtpError::Internal(source) => ApiError::Upstream(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthenticated("no".into()), StatusCode::UNAUTHORIZED),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ApiError::Forbidden, StatusCode::FORBIDDEN),
            (ApiError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                ApiError::RateLimited { wait_secs: 90 },
                StatusCode::TOO_MANY_REQUESTS,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_rate_limited_message_carries_wait() {
        let err = ApiError::RateLimited { wait_secs: 90 };
        assert_eq!(
            err.to_string(),
            "Please wait 90 seconds before requesting a new OTP."
        );
    }

    #[test]
    fn test_upstream_body_is_generic() {
        let err = ApiError::Upstream(anyhow::anyhow!("connection refused to 10.0.0.5"));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
