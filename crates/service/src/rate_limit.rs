use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

const WINDOW: Duration = Duration::from_secs(60);

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited,
}

/// Per-key sliding-window request limiter.
///
/// Each key holds the timestamps of its requests within the trailing
/// window. On every `admit`, timestamps older than the window are pruned
/// from the key's own list before the quota check, so the count is a true
/// sliding window even for a continuously active client. Keys that have
/// been idle for a full window are dropped outright.
pub struct RateLimiter {
    hits: DashMap<String, Vec<Instant>>,
    quota: usize,
    window: Duration,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32, enabled: bool) -> Self {
        Self::with_window(requests_per_minute, WINDOW, enabled)
    }

    pub fn with_window(quota: u32, window: Duration, enabled: bool) -> Self {
        Self {
            hits: DashMap::new(),
            quota: quota as usize,
            window,
            enabled,
        }
    }

    /// Called once per inbound request before any further processing.
    pub fn admit(&self, key: &str) -> Decision {
        if !self.enabled {
            return Decision::Allowed { remaining: self.quota as u32 };
        }
        let now = Instant::now();

        // Evict keys whose newest entry fell out of the window.
        self.hits
            .retain(|_, stamps| stamps.last().is_some_and(|t| now.duration_since(*t) < self.window));

        let mut stamps = self.hits.entry(key.to_owned()).or_default();
        stamps.retain(|t| now.duration_since(*t) < self.window);
        if stamps.len() >= self.quota {
            warn!(%key, count = stamps.len(), "rate limit exceeded");
            return Decision::Limited;
        }
        stamps.push(now);
        debug!(%key, count = stamps.len(), "request admitted");
        Decision::Allowed { remaining: (self.quota - stamps.len()) as u32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_is_enforced_per_key() {
        let limiter = RateLimiter::new(3, true);
        for _ in 0..3 {
            assert!(matches!(limiter.admit("10.0.0.1"), Decision::Allowed { .. }));
        }
        assert_eq!(limiter.admit("10.0.0.1"), Decision::Limited);
        // Another key is unaffected.
        assert!(matches!(limiter.admit("10.0.0.2"), Decision::Allowed { .. }));
        // And the first key stays limited within the window.
        assert_eq!(limiter.admit("10.0.0.1"), Decision::Limited);
    }

    #[test]
    fn remaining_counts_down() {
        let limiter = RateLimiter::new(3, true);
        assert_eq!(limiter.admit("k"), Decision::Allowed { remaining: 2 });
        assert_eq!(limiter.admit("k"), Decision::Allowed { remaining: 1 });
        assert_eq!(limiter.admit("k"), Decision::Allowed { remaining: 0 });
    }

    #[test]
    fn window_slides_for_an_active_key() {
        let limiter = RateLimiter::with_window(2, Duration::from_millis(40), true);
        assert!(matches!(limiter.admit("k"), Decision::Allowed { .. }));
        assert!(matches!(limiter.admit("k"), Decision::Allowed { .. }));
        assert_eq!(limiter.admit("k"), Decision::Limited);

        std::thread::sleep(Duration::from_millis(60));
        // Old timestamps expired, the same key is admitted again.
        assert!(matches!(limiter.admit("k"), Decision::Allowed { .. }));
    }

    #[test]
    fn disabled_limiter_admits_everything() {
        let limiter = RateLimiter::new(1, false);
        for _ in 0..100 {
            assert!(matches!(limiter.admit("k"), Decision::Allowed { .. }));
        }
    }
}
