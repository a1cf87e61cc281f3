//! Middleware
//!
//! Tower middleware for request processing.

pub mod auth;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod security;

pub use auth::{
    auth_middleware, optional_auth_middleware, AuthUser, TokenRejection, ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
};
pub use logging::{create_trace_layer, track_metrics};
pub use rate_limit::{rate_limit_auth, RateLimitInfo, RateLimiter};
pub use security::{SecurityHeadersConfig, SecurityHeadersLayer};
