use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use futures::FutureExt;

use sharedlog_core::Severity;
use sharedlog_observability::{Logger, log_at};

use crate::context::RequestScope;
use crate::errors::internal_error;

use super::client_ip;

/// Turn a panic anywhere downstream into one error record and a generic 500.
///
/// The panic payload goes to the log only; the client sees the request ID and
/// a timestamp.
pub async fn recover_panics(
    State(logger): State<Logger>,
    mut req: Request,
    next: Next,
) -> Response {
    let scope = RequestScope::ensure(&mut req);
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client_ip = client_ip(&req);

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let panic = panic_message(payload.as_ref());
            let request_id = scope.request_id();

            log_at!(
                logger,
                Severity::Error,
                panic = panic.as_str(),
                http_path = path.as_str(),
                http_method = method.as_str(),
                client_ip = client_ip.as_str(),
                request_id = request_id,
                "HTTP request panic recovered"
            );

            internal_error(request_id.unwrap_or_default())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
