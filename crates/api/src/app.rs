//! Router wiring for the request logging middleware.

use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;

use sharedlog_observability::Logger;

use crate::middleware;

/// Wrap `router` in the full middleware set.
///
/// Outermost first: request ID, access log, panic recovery, CORS. The request
/// ID is therefore visible to every later layer, the access log sees the 500
/// produced by recovery, and preflight responses are still access-logged.
pub fn with_logging_layers<S>(router: Router<S>, logger: Logger) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(from_fn(middleware::request_id))
            .layer(from_fn_with_state(logger.clone(), middleware::access_log))
            .layer(from_fn_with_state(logger, middleware::recover_panics))
            .layer(from_fn(middleware::cors)),
    )
}

/// Minimal service used by the binary: a health check behind the full stack.
pub fn build_app(logger: Logger) -> Router {
    with_logging_layers(Router::new().route("/health", get(health)), logger)
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
