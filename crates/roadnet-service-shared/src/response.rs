//! Response wrapper for successful HTTP responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Successful payload plus its content type.
///
/// The payload's fields are flattened into the top-level object:
///
/// ```
/// use roadnet_service_shared::ServiceResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Routes {
///     coordinates: Vec<Vec<[f64; 2]>>,
/// }
///
/// let response = ServiceResponse::new(Routes {
///     coordinates: vec![vec![[12.90, 77.50], [12.91, 77.51]]],
/// });
/// let json = serde_json::to_string(&response).unwrap();
/// assert!(json.starts_with("{\"coordinates\":[[[12.9,77.5]"));
/// assert!(json.ends_with("\"content_type\":\"application/json\"}"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,

    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    /// Wrap `data` with the `application/json` content type.
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
