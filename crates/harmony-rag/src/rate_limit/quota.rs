//! `N/unit` rate limit strings

use std::fmt;
use std::time::Duration;

/// Window unit of a rate limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatePeriod {
    Second,
    Minute,
    Hour,
    Day,
}

impl RatePeriod {
    fn parse(unit: &str) -> Option<Self> {
        match unit.to_ascii_lowercase().as_str() {
            "second" => Some(Self::Second),
            "minute" => Some(Self::Minute),
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            _ => None,
        }
    }

    /// Length of one window
    pub fn duration(&self) -> Duration {
        match self {
            Self::Second => Duration::from_secs(1),
            Self::Minute => Duration::from_secs(60),
            Self::Hour => Duration::from_secs(60 * 60),
            Self::Day => Duration::from_secs(24 * 60 * 60),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

/// A request quota: at most `count` requests per `period`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub count: u32,
    pub period: RatePeriod,
}

impl RateLimit {
    pub const fn new(count: u32, period: RatePeriod) -> Self {
        Self { count, period }
    }

    /// Parse `<positive integer>/<second|minute|hour|day>`.
    ///
    /// The count must be plain ASCII digits; the unit is case-insensitive.
    /// Anything else (extra segments, whitespace, signs, zero) is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        let (count, unit) = value.split_once('/')?;

        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let count: u32 = count.parse().ok()?;
        if count == 0 {
            return None;
        }

        let period = RatePeriod::parse(unit)?;
        Some(Self { count, period })
    }

    /// Parse `value`, falling back to `default`.
    ///
    /// A fallback records a warning naming `name` in `warnings`; settings are
    /// loaded before logging exists, so the caller replays them later.
    pub fn parse_or(
        value: &str,
        default: RateLimit,
        name: &str,
        warnings: &mut Vec<String>,
    ) -> Self {
        match Self::parse(value) {
            Some(limit) => limit,
            None => {
                warnings.push(format!(
                    "Invalid {} value {:?} (expected N/second|minute|hour|day), using default {}",
                    name, value, default
                ));
                default
            }
        }
    }

    /// Length of one counting window
    pub fn window(&self) -> Duration {
        self.period.duration()
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.count, self.period.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(
            RateLimit::parse("3/minute"),
            Some(RateLimit::new(3, RatePeriod::Minute))
        );
        assert_eq!(
            RateLimit::parse("100/HOUR"),
            Some(RateLimit::new(100, RatePeriod::Hour))
        );
        assert_eq!(
            RateLimit::parse("1/Second"),
            Some(RateLimit::new(1, RatePeriod::Second))
        );
        assert_eq!(
            RateLimit::parse("7/day"),
            Some(RateLimit::new(7, RatePeriod::Day))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "3",
            "minute",
            "3/minute/extra",
            "three/minute",
            "-3/minute",
            "+3/minute",
            "3/minutes",
            "3/week",
            " 3/minute",
            "3/minute ",
            "0/minute",
            "99999999999999/minute",
            "/minute",
            "3/",
        ] {
            assert_eq!(RateLimit::parse(bad), None, "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_parse_or_falls_back() {
        let default = RateLimit::new(30, RatePeriod::Minute);
        let mut warnings = Vec::new();

        assert_eq!(
            RateLimit::parse_or("5/second", default, "RATE_LIMIT_HEALTH", &mut warnings),
            RateLimit::new(5, RatePeriod::Second)
        );
        assert!(warnings.is_empty());

        assert_eq!(
            RateLimit::parse_or("oops", default, "RATE_LIMIT_HEALTH", &mut warnings),
            default
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Invalid RATE_LIMIT_HEALTH value \"oops\""));
        assert!(warnings[0].ends_with("using default 30/minute"));
    }

    #[test]
    fn test_display_round_trips() {
        let limit = RateLimit::new(3, RatePeriod::Minute);
        assert_eq!(limit.to_string(), "3/minute");
        assert_eq!(RateLimit::parse(&limit.to_string()), Some(limit));
    }
}
