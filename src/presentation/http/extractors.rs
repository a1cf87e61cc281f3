//! Custom Extractors
//!
//! Axum extractors for the caller's identity and client metadata.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, Extensions, HeaderMap},
};

use crate::application::services::ClientInfo;
use crate::presentation::middleware::auth::{require_auth, AuthUser};
use crate::shared::error::AppError;
use crate::startup::AppState;

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_auth(&parts.extensions)
    }
}

/// The caller if authenticated; anonymous requests pass through
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<i64> {
        self.0.map(|user| user.user_id)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AuthUser>().copied()))
    }
}

/// An authenticated caller holding the admin role
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = require_auth(&parts.extensions)?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin role required".into()));
        }
        Ok(AdminUser(user))
    }
}

/// User agent and address of the caller, recorded on new sessions
#[derive(Debug, Clone, Default)]
pub struct RequestClient(pub ClientInfo);

impl FromRequestParts<AppState> for RequestClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.chars().take(512).collect());

        let ip = client_ip(
            &parts.headers,
            &parts.extensions,
            state.settings.server.trust_proxy_headers,
        );
        let ip_address = (ip != UNKNOWN_CLIENT).then_some(ip);

        Ok(RequestClient(ClientInfo {
            user_agent,
            ip_address,
        }))
    }
}

const UNKNOWN_CLIENT: &str = "unknown";

/// Best-effort client address.
///
/// Proxy headers are client-controlled, so they are consulted only when
/// `trust_proxy_headers` is set: first hop of `X-Forwarded-For`, then
/// `X-Real-IP`. Otherwise the socket address is used.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(ip) = proxied_ip(headers) {
            return ip;
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn proxied_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
