//! Fixed-window request counter keyed by route and client

use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::quota::RateLimit;

/// Retry-after reported when no reset time can be derived
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request counted; `remaining` requests left in the window
    Allowed { remaining: u32 },
    /// Quota exhausted until the window resets
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    length: Duration,
    count: u32,
}

/// In-memory fixed-window limiter.
///
/// Each key owns one window. The check and the increment happen while the
/// `DashMap` entry is locked, so concurrent requests for the same key never
/// both observe the last free slot.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request for `key` against `limit`
    pub fn check(&self, key: &str, limit: RateLimit) -> RateLimitDecision {
        self.check_at(key, limit, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock reading
    pub fn check_at(&self, key: &str, limit: RateLimit, now: Instant) -> RateLimitDecision {
        let length = limit.window();
        let mut window = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            length,
            count: 0,
        });

        if now.saturating_duration_since(window.started) >= window.length {
            window.started = now;
            window.length = length;
            window.count = 0;
        }

        if window.count >= limit.count {
            let retry_after = (window.started + window.length)
                .checked_duration_since(now)
                .unwrap_or(Duration::from_secs(DEFAULT_RETRY_AFTER_SECS));
            return RateLimitDecision::Limited { retry_after };
        }

        window.count += 1;
        RateLimitDecision::Allowed {
            remaining: limit.count - window.count,
        }
    }

    /// Drop windows that have already expired
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < w.length);
        before.saturating_sub(self.windows.len())
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Whole seconds a client should wait, rounded up and never zero
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}
