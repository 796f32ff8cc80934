//! Request correlation ids.
//!
//! Every request gets an `x-request-id`: the one set by an upstream proxy if
//! present, otherwise a fresh UUID v4. The id is attached to the request as
//! a [`RequestId`] extension (picked up by the trace span), tagged on the
//! Sentry scope and echoed back in the response headers.

use axum::{
    extract::Request,
    http::{Extensions, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upstream ids longer than this are replaced.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// The current request's correlation id.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Read the id assigned by [`request_id_middleware`].
    #[must_use]
    pub fn from_extensions(extensions: &Extensions) -> Option<&str> {
        extensions.get::<Self>().map(|id| id.0.as_str())
    }
}

/// Assign and propagate the request id.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_UPSTREAM_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let header = HeaderValue::from_str(&request_id).ok();
    request.extensions_mut().insert(RequestId(request_id));

    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
