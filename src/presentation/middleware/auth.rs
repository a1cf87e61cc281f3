//! Authentication Middleware
//!
//! Access tokens are read from `Authorization: Bearer` first and from the
//! `access_token` cookie second. Validation is delegated to the auth service.

use axum::{
    extract::{Request, State},
    http::{Extensions, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};

use crate::domain::UserRole;
use crate::shared::error::AppError;
use crate::startup::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Authenticated user extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Why a presented token was not accepted; surfaced by the extractors
#[derive(Debug, Clone)]
pub struct TokenRejection(pub String);

/// Bearer header wins over the cookie
pub fn access_token_from(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve the caller from request extensions populated by
/// [`optional_auth_middleware`].
pub fn require_auth(extensions: &Extensions) -> Result<AuthUser, AppError> {
    if let Some(user) = extensions.get::<AuthUser>() {
        return Ok(*user);
    }

    let message = extensions
        .get::<TokenRejection>()
        .map(|rejection| rejection.0.clone())
        .unwrap_or_else(|| "Missing access token".into());

    Err(AppError::Unauthorized(message))
}

/// Attaches `AuthUser` when a valid token is present.
///
/// Never rejects; an invalid token is recorded as `TokenRejection` so that
/// protected handlers can report why.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = access_token_from(request.headers()) {
        match state.services.auth.validate_token(&token).await {
            Ok(user) => {
                request.extensions_mut().insert(AuthUser {
                    user_id: user.user_id,
                    role: user.role,
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected access token");
                let message = match AppError::from(e) {
                    AppError::Unauthorized(message) => message,
                    _ => "Invalid token".into(),
                };
                request.extensions_mut().insert(TokenRejection(message));
            }
        }
    }

    next.run(request).await
}

/// Rejects requests without an authenticated user.
///
/// Must run inside [`optional_auth_middleware`].
pub async fn auth_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    require_auth(request.extensions())?;
    Ok(next.run(request).await)
}
