//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Request ID (assign `x-request-id`)
//! 3. `TraceLayer` (request span carrying the request id)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Security headers (CSP, frame and sniffing protection)

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{LOGIN_PATH, OptionalSession, RequireSession, SessionRejection};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
