//! HTTP middleware for the dashboard.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//!
//! Identity is not a layer: handlers take [`RequireUser`], [`RequireAdmin`]
//! or [`OptionalUser`] as extractors.

pub mod identity;
pub mod request_id;
pub mod security_headers;

pub use identity::{CurrentUser, IdentityRejection, OptionalUser, RequireAdmin, RequireUser};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
