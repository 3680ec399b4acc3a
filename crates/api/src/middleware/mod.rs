//! Request logging middleware.
//!
//! Each function plugs into `axum::middleware::from_fn` (or
//! `from_fn_with_state` with a [`Logger`](sharedlog_observability::Logger)).
//! They communicate only through the [`RequestScope`](crate::context::RequestScope)
//! in request extensions. [`crate::app::with_logging_layers`] stacks them in
//! the expected order.

mod access_log;
mod cors;
mod recovery;
mod request_id;

pub use access_log::access_log;
pub use cors::{ALLOW_HEADERS, ALLOW_METHODS, cors};
pub use recovery::recover_panics;
pub use request_id::{X_REQUEST_ID, request_id};

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::{HeaderMap, HeaderName};

pub const X_CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Best-effort client address: first `X-Forwarded-For` hop, then `X-Real-IP`,
/// then the peer address; empty when none is known.
pub fn client_ip(req: &Request) -> String {
    let forwarded = header_str(req.headers(), &X_FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded.or_else(|| header_str(req.headers(), &X_REAL_IP)) {
        return ip.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}
