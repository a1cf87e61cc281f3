//! Rate Limiting Middleware
//!
//! In-process fixed-window limiter for the credential endpoints. Each client
//! address gets `requests_per_window` requests per window across all of
//! them; the window starts with the first request and resets once it has
//! elapsed.

use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use serde::Serialize;

use crate::config::RateLimitSettings;
use crate::presentation::http::extractors::client_ip;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Rate limit status for one client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Seconds until the window resets
    pub retry_after: u64,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter per client key.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit: limit.max(1),
            window,
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(
            settings.auth_requests_per_window,
            Duration::from_secs(settings.window_seconds),
        )
    }

    /// Count one request for `key`.
    ///
    /// Returns `Ok` while the client is within its budget and `Err` once
    /// the budget for the current window is spent.
    pub fn check(&self, key: &str) -> Result<RateLimitInfo, RateLimitInfo> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<RateLimitInfo, RateLimitInfo> {
        // The entry guard holds the shard lock, so read-modify-write is atomic per key
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let elapsed = now.duration_since(entry.started);
        let retry_after = self.window.saturating_sub(elapsed).as_secs().max(1);

        if entry.count >= self.limit {
            return Err(RateLimitInfo {
                limit: self.limit,
                remaining: 0,
                retry_after,
            });
        }

        entry.count += 1;
        Ok(RateLimitInfo {
            limit: self.limit,
            remaining: self.limit - entry.count,
            retry_after: 0,
        })
    }

    /// Drop windows that have already elapsed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, window| now.duration_since(window.started) < self.window);
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Middleware for the credential endpoints (register, login, reset).
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(
        request.headers(),
        request.extensions(),
        state.settings.server.trust_proxy_headers,
    );

    match state.rate_limiter.check(&ip) {
        Ok(info) => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(info.limit));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(info.remaining));
            response
        }
        Err(info) => {
            tracing::warn!(client = %ip, path = %request.uri().path(), "Rate limit exceeded");
            AppError::RateLimited {
                retry_after_secs: info.retry_after,
            }
            .into_response()
        }
    }
}
