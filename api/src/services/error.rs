//! Error taxonomy shared by the provider clients and route handlers

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use super::twitter::RateLimitStatus;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed caller input
    #[error("{0}")]
    Validation(String),

    /// The client-credentials exchange failed; `body` is the provider's raw response
    #[error("bearer token exchange failed: {body}")]
    Authentication { body: String },

    /// A provider answered with a non-success status, or could not be reached
    #[error("upstream returned {status}: {body}")]
    Upstream {
        status: StatusCode,
        body: String,
        rate_limit: Option<RateLimitStatus>,
    },

    /// The image-post orchestrator failed; reported as a 500 with a string detail
    #[error("orchestrator failed: {0}")]
    Orchestrator(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn upstream(status: StatusCode, body: impl Into<String>) -> Self {
        ApiError::Upstream {
            status,
            body: body.into(),
            rate_limit: None,
        }
    }

    /// Collapse any non-validation failure into the orchestrator envelope.
    pub fn into_orchestrator_failure(self) -> Self {
        match self {
            ApiError::Validation(_) | ApiError::Orchestrator(_) => self,
            ApiError::Upstream { status, body, .. } => {
                ApiError::Orchestrator(format!("{} ({})", body, status))
            }
            other => ApiError::Orchestrator(other.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Orchestrator(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Provider bodies are passed through as JSON when they parse, else as text.
fn details_value(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::Validation(message) => json!({ "error": message }),
            ApiError::Authentication { body } => {
                tracing::warn!(%status, "X API token exchange failed");
                json!({
                    "error": "Failed to authenticate with X API",
                    "details": details_value(&body),
                })
            }
            ApiError::Upstream {
                status: upstream,
                body,
                rate_limit,
            } => {
                tracing::warn!(status = %upstream, "X API request failed");
                let mut payload = json!({
                    "error": "Failed to fetch tweets",
                    "details": details_value(&body),
                });
                if let Some(rate_limit) = rate_limit {
                    payload["rateLimit"] = json!(rate_limit);
                }
                payload
            }
            ApiError::Orchestrator(details) => {
                tracing::warn!(%details, "Instagram scrape failed");
                json!({
                    "error": "Failed to fetch Instagram posts",
                    "details": details,
                })
            }
            ApiError::Internal(cause) => {
                tracing::error!(%cause, "Unhandled error while serving request");
                json!({
                    "error": "Internal server error",
                    "message": "An unexpected error occurred",
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        let status = if e.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else {
            StatusCode::BAD_GATEWAY
        };
        ApiError::upstream(status, e.to_string())
    }
}

/// Extension trait for logging errors and converting to ApiError
pub trait LogErr<T> {
    /// Log error with context and return an Internal error
    fn log_internal(self, context: &str) -> ApiResult<T>;

    /// Log error with context and return an Upstream error with the given status
    fn log_upstream(self, context: &str, status: StatusCode) -> ApiResult<T>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_internal(self, context: &str) -> ApiResult<T> {
        self.map_err(|e| {
            tracing::error!("{}: {}", context, e);
            ApiError::Internal(format!("{}: {}", context, e))
        })
    }

    fn log_upstream(self, context: &str, status: StatusCode) -> ApiResult<T> {
        self.map_err(|e| {
            tracing::warn!("{}: {}", context, e);
            ApiError::upstream(status, format!("{}: {}", context, e))
        })
    }
}
