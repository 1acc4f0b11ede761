//! Road routing HTTP service.
//!
//! # Endpoints
//!
//! - `POST /calculate-route` - Compute one or more routes between two coordinates
//! - `GET /` - Plain-text banner
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! The binary in `main.rs` only wires configuration to [`router`]; tests
//! drive the same router in-process.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::Method,
    routing::{get, post},
    Json, Router,
};
use tokio::time::timeout;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use roadnet_lib::{RouteOutput, SearchControl};
use roadnet_service_shared::{
    from_lib_error, health_live, health_ready, metrics_handler, record_route_calculated,
    record_route_failed, record_route_nodes, AppState, CalculateRouteRequest, ErrorBody,
    MetricsConfig, MetricsLayer, RequestId, ServiceResponse, Validate,
};

/// Body returned by `GET /`.
pub const BANNER: &str = "Route server is running!";

/// Build the service router.
pub fn router(state: AppState, metrics: &MetricsConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/", get(index))
        .route("/calculate-route", post(calculate_route).layer(cors))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready));
    if metrics.enabled {
        app = app.route(&metrics.path, get(metrics_handler));
    }

    app.layer(MetricsLayer).with_state(state)
}

async fn index() -> &'static str {
    BANNER
}

/// Handle `POST /calculate-route`.
///
/// The search runs on the blocking pool; when it exceeds the configured
/// budget its cancellation flag is raised and the request fails.
pub async fn calculate_route(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<CalculateRouteRequest>, JsonRejection>,
) -> Result<ServiceResponse<RouteOutput>, ErrorBody> {
    let request_id = request_id.as_str();

    let Json(request) = payload.map_err(|rejection| {
        warn!(request_id, error = %rejection, "rejected route request body");
        fail(ErrorBody::invalid_request(rejection.body_text(), request_id))
    })?;

    info!(
        request_id,
        origin = ?request.origin,
        destination = ?request.destination,
        num_routes = request.num_routes,
        strategy = %request.strategy,
        metric = %request.metric,
        "handling route request"
    );

    request.validate(request_id).map_err(|body| fail(*body))?;
    let route_request = request.to_route_request().ok_or_else(|| {
        fail(ErrorBody::invalid_request(
            "origin and destination must be [lat, lon]",
            request_id,
        ))
    })?;

    let engine = state
        .engine()
        .map_err(|e| fail(from_lib_error(&e, request_id)))?
        .clone();

    let control = SearchControl::new();
    let search_control = control.clone();
    let search = tokio::task::spawn_blocking(move || {
        engine
            .plan_with(&route_request, &search_control)
            .map(|plan| (RouteOutput::from_plan(engine.graph(), &plan), plan))
    });

    let (output, plan) = match timeout(state.route_timeout(), search).await {
        Ok(Ok(Ok(result))) => result,
        Ok(Ok(Err(e))) => {
            error!(request_id, error = %e, "route planning failed");
            return Err(fail(from_lib_error(&e, request_id)));
        }
        Ok(Err(join_error)) => {
            error!(request_id, error = %join_error, "route worker panicked");
            return Err(fail(ErrorBody::internal_error(
                "route worker failed",
                request_id,
            )));
        }
        Err(_) => {
            control.cancel();
            let timeout_ms = state.route_timeout().as_millis() as u64;
            warn!(request_id, timeout_ms, "route search timed out");
            return Err(fail(ErrorBody::timed_out(timeout_ms, request_id)));
        }
    };

    let strategy = plan.strategy.to_string();
    record_route_calculated(plan.routes().len(), &strategy, plan.metric.as_str());
    for route in plan.routes() {
        record_route_nodes(route.nodes().len(), &strategy);
    }

    info!(
        request_id,
        origin_node = plan.origin_node,
        destination_node = plan.destination_node,
        routes = plan.routes().len(),
        nodes = plan.routes().first().map_or(0, |route| route.nodes().len()),
        "route computed successfully"
    );

    Ok(ServiceResponse::new(output))
}

/// Count a failure under its kind before returning it.
fn fail(body: ErrorBody) -> ErrorBody {
    record_route_failed(body.kind.as_deref().unwrap_or("internal"));
    body
}
