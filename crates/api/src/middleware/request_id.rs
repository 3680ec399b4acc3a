use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::context::RequestScope;

use super::header_str;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Adopt the inbound `X-Request-ID` (or generate a UUID), store it in the
/// request scope and echo it on the response.
///
/// Must run before anything that wants to log the request ID.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let candidate = header_str(req.headers(), &X_REQUEST_ID)
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let scope = RequestScope::ensure(&mut req);
    let id = scope.assign_request_id(candidate).to_owned();

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
