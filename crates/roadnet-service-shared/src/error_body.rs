//! Error bodies returned by the route service.
//!
//! Every failure is reported with the same shape:
//!
//! ```json
//! {
//!   "error": "Failed to calculate route",
//!   "details": "no path found between node 1 and node 5",
//!   "kind": "no_path_found",
//!   "instance": "0190b7c4-..."
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use roadnet_lib::{Error as LibError, ErrorKind};

/// Summary reported in the `error` field of every route failure.
pub const ROUTE_FAILURE: &str = "Failed to calculate route";

/// JSON error body with its HTTP status.
///
/// # Example
///
/// ```
/// use roadnet_service_shared::ErrorBody;
///
/// let body = ErrorBody::invalid_request("origin must be [lat, lon]", "req-12345");
/// assert_eq!(body.status, 500);
/// assert_eq!(body.kind.as_deref(), Some("invalid_request"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short summary of what failed.
    pub error: String,

    /// Human-readable explanation specific to this occurrence.
    pub details: String,

    /// Machine-readable error kind (snake_case).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Request identifier for log correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// HTTP status code; not part of the body.
    #[serde(skip)]
    pub status: u16,
}

impl ErrorBody {
    /// Create a route failure with a 500 status.
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            error: ROUTE_FAILURE.to_string(),
            details: details.into(),
            kind: None,
            instance: None,
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = Some(kind.as_str().to_string());
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status.as_u16();
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Malformed or out-of-contract request.
    pub fn invalid_request(details: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(details)
            .with_kind(ErrorKind::InvalidRequest)
            .with_request_id(request_id)
    }

    /// Graph not loaded; reported with 503.
    pub fn service_unavailable(details: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(details)
            .with_kind(ErrorKind::GraphUnavailable)
            .with_status(StatusCode::SERVICE_UNAVAILABLE)
            .with_request_id(request_id)
    }

    /// Search exceeded the configured time budget.
    pub fn timed_out(timeout_ms: u64, request_id: impl Into<String>) -> Self {
        Self::new(format!("route search exceeded {timeout_ms} ms and was cancelled"))
            .with_kind(ErrorKind::Cancelled)
            .with_request_id(request_id)
    }

    pub fn internal_error(details: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(details)
            .with_kind(ErrorKind::Internal)
            .with_request_id(request_id)
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.details)
    }
}

impl std::error::Error for ErrorBody {}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Convert a library error into the uniform error body.
///
/// Every kind maps to 500 except [`ErrorKind::GraphUnavailable`], which maps to 503.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ErrorBody {
    match error.kind() {
        ErrorKind::GraphUnavailable => ErrorBody::service_unavailable(error.to_string(), request_id),
        kind => ErrorBody::new(error.to_string())
            .with_kind(kind)
            .with_request_id(request_id),
    }
}
