//! Error handling module with type-safe, non-exhaustive error types
//!
//! The guard itself never fails a request: unreadable signals count as
//! absent. Errors here come from the service around it, mostly the upstream
//! forward, and are rendered as JSON with a correlation id. Upstream error
//! details are logged, never sent to the client.

use std::time::Duration;

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigError;

/// Non-exhaustive error enum for forward compatibility
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EdgeGuardError {
    /// Upstream could not be reached or answered with a broken response
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Upstream did not answer in time
    #[error("Upstream timed out after {duration:?}")]
    Timeout {
        /// Configured request timeout
        duration: Duration,
    },

    /// Request body could not be buffered for forwarding
    #[error("Request body rejected: {reason}")]
    BodyRejected {
        /// Why the body was rejected
        reason: String,
    },

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Metric registration or encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Internal error (details sanitized in responses)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Stable error codes for API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Upstream unreachable or broken
    UpstreamUnavailable,
    /// Upstream too slow
    UpstreamTimeout,
    /// Request body too large or unreadable
    BodyRejected,
    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            Self::BodyRejected => "BODY_REJECTED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this code
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::BodyRejected => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured error response with correlation ID
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message (sanitized)
    pub message: String,
    /// Correlation ID for tracing
    pub correlation_id: Uuid,
}

impl ErrorResponse {
    /// Create a new error response from an [`EdgeGuardError`]
    #[must_use]
    pub fn from_error(error: &EdgeGuardError, correlation_id: Uuid) -> Self {
        let code = error.code();
        let message = match error {
            EdgeGuardError::Upstream(_) => "Upstream service unavailable".to_string(),
            EdgeGuardError::Timeout { .. } => "Upstream service timed out".to_string(),
            EdgeGuardError::BodyRejected { reason } => format!("Request body rejected: {reason}"),
            // Never expose internal error details
            EdgeGuardError::Config(_)
            | EdgeGuardError::Metrics(_)
            | EdgeGuardError::Internal(_) => "Internal error".to_string(),
        };
        Self {
            code,
            message,
            correlation_id,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.code.http_status(), Json(self)).into_response()
    }
}

impl EdgeGuardError {
    /// Get the error code for this error
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Upstream(e) if e.is_timeout() => ErrorCode::UpstreamTimeout,
            Self::Upstream(_) => ErrorCode::UpstreamUnavailable,
            Self::Timeout { .. } => ErrorCode::UpstreamTimeout,
            Self::BodyRejected { .. } => ErrorCode::BodyRejected,
            Self::Config(_) | Self::Metrics(_) | Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Renders the error for a client.
    #[must_use]
    pub fn to_response(&self, correlation_id: Uuid) -> Response {
        ErrorResponse::from_error(self, correlation_id).into_response()
    }
}

impl From<std::io::Error> for EdgeGuardError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(anyhow::anyhow!("IO error: {err}"))
    }
}
