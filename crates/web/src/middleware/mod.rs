//! HTTP middleware stack for the web app.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Session layer (tower-sessions, in-memory store)
//! 6. Tenant resolution (tenant-scoped routes only, see [`crate::tenant`])
//! 7. Rate limiting (login action only)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AdminArea, AreaGate, AreaRejection, BookingArea, OptionalUser, RequireArea, StaffArea,
};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SessionHandle, create_session_layer};
