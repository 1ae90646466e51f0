//! Per-client rate limiting
//!
//! Quotas are written as `N/unit` strings in the environment and counted
//! per route and client IP in fixed windows.

pub mod limiter;
pub mod quota;

pub use limiter::{retry_after_secs, RateLimitDecision, RateLimiter, DEFAULT_RETRY_AFTER_SECS};
pub use quota::{RateLimit, RatePeriod};
