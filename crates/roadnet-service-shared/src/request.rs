//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use roadnet_lib::{
    geo, Coordinate, ErrorKind, RouteRequest, RouteStrategy, WeightMetric, MAX_ROUTES,
};

use crate::ErrorBody;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return an `ErrorBody`
/// for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ErrorBody`.
    ///
    /// Returns a boxed `ErrorBody` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ErrorBody>>;
}

/// Body of `POST /calculate-route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRouteRequest {
    /// Origin as `[lat, lon]`.
    pub origin: Vec<f64>,

    /// Destination as `[lat, lon]`.
    pub destination: Vec<f64>,

    /// Number of routes to return.
    #[serde(default = "default_num_routes")]
    pub num_routes: i64,

    /// How additional routes are produced.
    #[serde(default)]
    pub strategy: RouteStrategy,

    /// Edge cost used by the search.
    #[serde(default)]
    pub metric: WeightMetric,
}

fn default_num_routes() -> i64 {
    1
}

impl CalculateRouteRequest {
    /// Convert into the library request. Call [`Validate::validate`] first.
    pub fn to_route_request(&self) -> Option<RouteRequest> {
        let origin = pair(&self.origin)?;
        let destination = pair(&self.destination)?;
        Some(
            RouteRequest::new(origin, destination)
                .with_num_routes(self.num_routes)
                .with_strategy(self.strategy)
                .with_metric(self.metric),
        )
    }
}

fn pair(values: &[f64]) -> Option<Coordinate> {
    match values {
        [lat, lon] => Some(Coordinate::new(*lat, *lon)),
        _ => None,
    }
}

fn check_point(field: &str, values: &[f64], request_id: &str) -> Result<(), Box<ErrorBody>> {
    let Some(point) = pair(values) else {
        return Err(Box::new(ErrorBody::invalid_request(
            format!(
                "The '{field}' field must contain exactly two numbers [lat, lon], got {}",
                values.len()
            ),
            request_id,
        )));
    };

    geo::validate(point.lat, point.lon).map_err(|err| {
        Box::new(
            ErrorBody::new(format!("The '{field}' field is invalid: {err}"))
                .with_kind(ErrorKind::InvalidCoordinate)
                .with_request_id(request_id),
        )
    })
}

impl Validate for CalculateRouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ErrorBody>> {
        check_point("origin", &self.origin, request_id)?;
        check_point("destination", &self.destination, request_id)?;

        if self.num_routes < 1 {
            return Err(Box::new(ErrorBody::invalid_request(
                "The 'num_routes' field must be at least 1",
                request_id,
            )));
        }

        if self.num_routes > MAX_ROUTES {
            return Err(Box::new(ErrorBody::invalid_request(
                format!("The 'num_routes' field cannot exceed {MAX_ROUTES}"),
                request_id,
            )));
        }

        Ok(())
    }
}
