//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! The storefront serves no scripts at all, so the policy is strict. Two
//! origins are let through: the remote API's origin for product and
//! category images, and the hosted payment page that checkout redirects to.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Origin of the hosted card-payment page.
pub const PAYMENT_ORIGIN: &str = "https://checkout.stripe.com";

/// Build the Content-Security-Policy for an image origin.
///
/// ```text
/// default-src 'none';
/// style-src 'self';
/// img-src 'self' <image origin>;
/// form-action 'self' https://checkout.stripe.com;
/// base-uri 'self';
/// frame-ancestors 'none'
/// ```
#[must_use]
pub fn content_security_policy(image_origin: &str) -> String {
    format!(
        "default-src 'none'; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' {image_origin}; \
         connect-src 'self'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self' {PAYMENT_ORIGIN}; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
///
/// Pages are marked `no-store`; files under `/static` keep whatever caching
/// the file service chose.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let is_static = request.uri().path().starts_with("/static/");
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("same-origin"));

    let image_origin = state.config().api.base_url.origin().ascii_serialization();
    match HeaderValue::from_str(&content_security_policy(&image_origin)) {
        Ok(csp) => {
            headers.insert(CONTENT_SECURITY_POLICY, csp);
        }
        Err(e) => tracing::error!("Invalid CSP header value: {e}"),
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), geolocation=(), microphone=(), payment=(), usb=(), interest-cohort=()",
        ),
    );

    if !is_static {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    // API-hosted images carry no CORP headers
    headers.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("credentialless"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_allows_image_origin_and_payment_page() {
        let csp = content_security_policy("https://ecommerce.routemisr.com");
        assert!(csp.contains("img-src 'self' https://ecommerce.routemisr.com;"));
        assert!(csp.contains("form-action 'self' https://checkout.stripe.com;"));
        assert!(csp.starts_with("default-src 'none';"));
        assert!(!csp.contains("script-src"));
    }
}
