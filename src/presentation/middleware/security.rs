//! Security Headers Middleware
//!
//! Stamps a fixed set of response headers on every response. The header
//! values are rendered once when the layer is built.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Request, Response},
};
use tower::{Layer, Service};

/// Security headers configuration
#[derive(Clone, Debug)]
pub struct SecurityHeadersConfig {
    /// Send `Strict-Transport-Security`; only meaningful behind HTTPS
    pub enable_hsts: bool,
    /// HSTS max-age in seconds
    pub hsts_max_age: u64,
    pub content_security_policy: String,
    pub referrer_policy: String,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enable_hsts: false,
            hsts_max_age: 31_536_000,
            // JSON API: nothing should ever be rendered or framed
            content_security_policy: "default-src 'none'; frame-ancestors 'none'".to_string(),
            referrer_policy: "no-referrer".to_string(),
        }
    }
}

impl SecurityHeadersConfig {
    fn render(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = vec![
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
            (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        ];

        if let Ok(value) = HeaderValue::from_str(&self.content_security_policy) {
            headers.push((header::CONTENT_SECURITY_POLICY, value));
        }
        if let Ok(value) = HeaderValue::from_str(&self.referrer_policy) {
            headers.push((header::REFERRER_POLICY, value));
        }
        if self.enable_hsts {
            if let Ok(value) =
                HeaderValue::from_str(&format!("max-age={}; includeSubDomains", self.hsts_max_age))
            {
                headers.push((header::STRICT_TRANSPORT_SECURITY, value));
            }
        }

        headers
    }
}

/// Layer that adds security headers to responses
#[derive(Clone)]
pub struct SecurityHeadersLayer {
    headers: Arc<Vec<(HeaderName, HeaderValue)>>,
}

impl SecurityHeadersLayer {
    pub fn new(config: SecurityHeadersConfig) -> Self {
        Self {
            headers: Arc::new(config.render()),
        }
    }

    /// Default policy; HSTS follows whether the deployment serves HTTPS.
    pub fn for_api(https: bool) -> Self {
        Self::new(SecurityHeadersConfig {
            enable_hsts: https,
            ..Default::default()
        })
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersMiddleware {
            inner,
            headers: self.headers.clone(),
        }
    }
}

/// Middleware service that adds security headers
#[derive(Clone)]
pub struct SecurityHeadersMiddleware<S> {
    inner: S,
    headers: Arc<Vec<(HeaderName, HeaderValue)>>,
}

impl<S> Service<Request<Body>> for SecurityHeadersMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // The service that was polled ready must be the one called
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let headers = self.headers.clone();

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            let target = response.headers_mut();
            for (name, value) in headers.iter() {
                // Handlers may set their own policy
                if !target.contains_key(name) {
                    target.insert(name.clone(), value.clone());
                }
            }
            Ok(response)
        })
    }
}
