use std::time::Instant;

use axum::body::HttpBody;
use axum::extract::{Request, State};
use axum::http::header::USER_AGENT;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use sharedlog_core::Severity;
use sharedlog_observability::{Logger, log_at};

use crate::context::RequestScope;

use super::{X_CORRELATION_ID, client_ip, header_str};

/// One record per finished request (or one per recorded handler error for
/// 4xx/5xx responses).
///
/// | Status | Severity | Message |
/// |--------|----------|---------|
/// | 500+ | error | `HTTP request server error` |
/// | 400–499 | warn | `HTTP request client error` |
/// | other | info | `HTTP request completed` |
pub async fn access_log(State(logger): State<Logger>, mut req: Request, next: Next) -> Response {
    let start = Instant::now();
    let scope = RequestScope::ensure(&mut req);

    let method = req.method().clone();
    let path = match req.uri().query() {
        Some(query) if !query.is_empty() => format!("{}?{}", req.uri().path(), query),
        _ => req.uri().path().to_string(),
    };
    let client_ip = client_ip(&req);
    let user_agent = header_str(req.headers(), &USER_AGENT)
        .unwrap_or_default()
        .to_string();
    if let Some(id) = header_str(req.headers(), &X_CORRELATION_ID) {
        scope.set_correlation_id(id);
    }

    let response = next.run(req).await;

    let latency = start.elapsed();
    let status = response.status();
    let body_size = response
        .body()
        .size_hint()
        .exact()
        .map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));

    let (severity, message) = classify(status);
    let errors = match severity {
        Severity::Info => Vec::new(),
        _ => scope.errors(),
    };
    let ctx = scope.log_context();

    let emit = |error: Option<&str>| {
        log_at!(
            logger,
            severity,
            context: &ctx,
            http_status = status.as_u16(),
            http_method = method.as_str(),
            http_path = path.as_str(),
            client_ip = client_ip.as_str(),
            latency = latency.as_secs_f64(),
            user_agent = user_agent.as_str(),
            body_size = body_size,
            error = error,
            "{}",
            message
        );
    };

    if errors.is_empty() {
        emit(None);
    } else {
        for error in &errors {
            emit(Some(error.as_str()));
        }
    }

    response
}

fn classify(status: StatusCode) -> (Severity, &'static str) {
    if status.is_server_error() || status.as_u16() >= 600 {
        (Severity::Error, "HTTP request server error")
    } else if status.is_client_error() {
        (Severity::Warn, "HTTP request client error")
    } else {
        (Severity::Info, "HTTP request completed")
    }
}
