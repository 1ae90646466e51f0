//! Request interceptors run before route dispatch
//!
//! Each interceptor checks one thing and either lets the request through or
//! rejects it with an [`Error`] that renders as the HTTP response. The chain
//! stops at the first rejection.

use axum::http::{header, HeaderMap, Method};
use std::sync::Arc;

use crate::config::{RateLimitConfig, Secret, Settings};
use crate::error::{Error, Result};
use crate::rate_limit::{retry_after_secs, RateLimit, RateLimitDecision, RateLimiter};

/// Path of the health check route
pub const HEALTH_PATH: &str = "/";

/// What interceptors may look at. The body is never available here.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: Method,
    pub path: String,
    pub client_ip: String,
    pub headers: HeaderMap,
}

/// One pre-dispatch check
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(())` forwards to the next interceptor, `Err` ends the request
    fn intercept(&self, request: &RequestMeta) -> Result<()>;
}

/// Rejects requests whose declared `Content-Length` exceeds the limit
pub struct RequestSizeGuard {
    max_size: u64,
}

impl RequestSizeGuard {
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }
}

impl Interceptor for RequestSizeGuard {
    fn name(&self) -> &'static str {
        "request-size"
    }

    fn intercept(&self, request: &RequestMeta) -> Result<()> {
        let Some(value) = request.headers.get(header::CONTENT_LENGTH) else {
            return Ok(());
        };

        let requested_size = value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| Error::BadRequest("Invalid Content-Length header".to_string()))?;

        if requested_size > self.max_size {
            return Err(Error::RequestTooLarge {
                max_size: self.max_size,
                requested_size,
            });
        }

        Ok(())
    }
}

/// Requires the configured API key header outside development mode
pub struct ApiKeyGuard {
    header: String,
    key: Secret,
    development_mode: bool,
}

impl ApiKeyGuard {
    pub fn new(header: impl Into<String>, key: Secret, development_mode: bool) -> Self {
        Self {
            header: header.into(),
            key,
            development_mode,
        }
    }
}

impl Interceptor for ApiKeyGuard {
    fn name(&self) -> &'static str {
        "api-key"
    }

    fn intercept(&self, request: &RequestMeta) -> Result<()> {
        if request.path == HEALTH_PATH || self.development_mode {
            return Ok(());
        }

        let provided = request
            .headers
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if provided.is_empty() {
            return Err(Error::MissingApiKey {
                header: self.header.clone(),
            });
        }

        // plain comparison, kept for parity with existing clients
        if provided != self.key.expose() {
            return Err(Error::InvalidApiKey {
                header: self.header.clone(),
            });
        }

        Ok(())
    }
}

/// Per-route, per-client-IP quotas
pub struct RateLimitGuard {
    limiter: Arc<RateLimiter>,
    limits: RateLimitConfig,
}

impl RateLimitGuard {
    pub fn new(limiter: Arc<RateLimiter>, limits: RateLimitConfig) -> Self {
        Self { limiter, limits }
    }

    /// Quota for a route; unknown paths are not limited
    fn limit_for(&self, path: &str) -> Option<RateLimit> {
        match path {
            "/generate/" => Some(self.limits.generate),
            "/chat/" => Some(self.limits.chat),
            HEALTH_PATH => Some(self.limits.health),
            _ => None,
        }
    }
}

impl Interceptor for RateLimitGuard {
    fn name(&self) -> &'static str {
        "rate-limit"
    }

    fn intercept(&self, request: &RequestMeta) -> Result<()> {
        let Some(limit) = self.limit_for(&request.path) else {
            return Ok(());
        };

        let key = format!("{}:{}", request.path, request.client_ip);
        match self.limiter.check(&key, limit) {
            RateLimitDecision::Allowed { remaining } => {
                tracing::debug!(
                    "{} has {} requests left on {} ({})",
                    request.client_ip,
                    remaining,
                    request.path,
                    limit
                );
                Ok(())
            }
            RateLimitDecision::Limited { retry_after } => {
                let retry_after = retry_after_secs(retry_after);
                tracing::warn!(
                    "Rate limit exceeded for {} on {} (retry after {}s)",
                    request.client_ip,
                    request.path,
                    retry_after
                );
                Err(Error::RateLimited {
                    detail: format!("Rate limit of {} exceeded", limit),
                    retry_after,
                })
            }
        }
    }
}

/// Ordered interceptors; the first rejection wins
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size guard, then API key guard, then rate limiter
    pub fn from_settings(settings: &Settings, limiter: Arc<RateLimiter>) -> Self {
        Self::new()
            .with(RequestSizeGuard::new(settings.max_request_size))
            .with(ApiKeyGuard::new(
                settings.api_key_header.clone(),
                settings.api_key.clone(),
                settings.development_mode,
            ))
            .with(RateLimitGuard::new(limiter, settings.rate_limits))
    }

    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub fn run(&self, request: &RequestMeta) -> Result<()> {
        for interceptor in &self.interceptors {
            if let Err(e) = interceptor.intercept(request) {
                tracing::debug!("Request rejected by {} interceptor", interceptor.name());
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RatePeriod;
    use axum::http::HeaderValue;

    fn meta(path: &str) -> RequestMeta {
        RequestMeta {
            method: Method::POST,
            path: path.to_string(),
            client_ip: "10.0.0.7".to_string(),
            headers: HeaderMap::new(),
        }
    }

    fn with_header(mut meta: RequestMeta, name: &'static str, value: &str) -> RequestMeta {
        meta.headers
            .insert(name, HeaderValue::from_str(value).unwrap());
        meta
    }

    #[test]
    fn test_request_size_guard() {
        let guard = RequestSizeGuard::new(100);

        assert!(guard.intercept(&meta("/generate/")).is_ok());
        assert!(guard
            .intercept(&with_header(meta("/generate/"), "content-length", "100"))
            .is_ok());
        assert!(matches!(
            guard.intercept(&with_header(meta("/generate/"), "content-length", "101")),
            Err(Error::RequestTooLarge {
                max_size: 100,
                requested_size: 101
            })
        ));
        assert!(matches!(
            guard.intercept(&with_header(meta("/generate/"), "content-length", "lots")),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn test_api_key_guard() {
        let guard = ApiKeyGuard::new("X-API-Key", Secret::new("s3cret"), false);

        assert!(matches!(
            guard.intercept(&meta("/generate/")),
            Err(Error::MissingApiKey { .. })
        ));
        assert!(matches!(
            guard.intercept(&with_header(meta("/generate/"), "x-api-key", "")),
            Err(Error::MissingApiKey { .. })
        ));
        assert!(matches!(
            guard.intercept(&with_header(meta("/chat/"), "x-api-key", "wrong")),
            Err(Error::InvalidApiKey { .. })
        ));
        assert!(guard
            .intercept(&with_header(meta("/chat/"), "x-api-key", "s3cret"))
            .is_ok());
        assert!(guard.intercept(&meta(HEALTH_PATH)).is_ok());
    }

    #[test]
    fn test_api_key_guard_development_mode() {
        let guard = ApiKeyGuard::new("X-API-Key", Secret::new("s3cret"), true);
        assert!(guard.intercept(&meta("/generate/")).is_ok());
    }

    #[test]
    fn test_rate_limit_guard() {
        let limits = RateLimitConfig {
            generate: RateLimit::new(2, RatePeriod::Minute),
            ..RateLimitConfig::default()
        };
        let guard = RateLimitGuard::new(Arc::new(RateLimiter::new()), limits);

        assert!(guard.intercept(&meta("/generate/")).is_ok());
        assert!(guard.intercept(&meta("/generate/")).is_ok());
        match guard.intercept(&meta("/generate/")) {
            Err(Error::RateLimited { retry_after, detail }) => {
                assert!(retry_after >= 1 && retry_after <= 60);
                assert!(detail.contains("2/minute"));
            }
            other => panic!("expected rate limit, got {:?}", other),
        }

        // separate windows per route and per client
        assert!(guard.intercept(&meta("/chat/")).is_ok());
        let mut other_client = meta("/generate/");
        other_client.client_ip = "10.0.0.8".to_string();
        assert!(guard.intercept(&other_client).is_ok());

        // unknown routes are not limited
        for _ in 0..10 {
            assert!(guard.intercept(&meta("/docs")).is_ok());
        }
    }

    #[test]
    fn test_chain_order() {
        let settings = Settings {
            api_key: Secret::new("s3cret"),
            max_request_size: 10,
            ..Settings::default()
        };
        let chain = InterceptorChain::from_settings(&settings, Arc::new(RateLimiter::new()));
        assert_eq!(chain.names(), vec!["request-size", "api-key", "rate-limit"]);

        // size is checked before the key
        let request = with_header(meta("/generate/"), "content-length", "11");
        assert!(matches!(
            chain.run(&request),
            Err(Error::RequestTooLarge { .. })
        ));

        // rejected keys never consume quota
        for _ in 0..5 {
            assert!(matches!(
                chain.run(&meta("/generate/")),
                Err(Error::MissingApiKey { .. })
            ));
        }
        let authorized = with_header(meta("/generate/"), "x-api-key", "s3cret");
        assert!(chain.run(&authorized).is_ok());
    }
}
