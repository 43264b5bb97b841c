//! In-memory sliding-window rate limiter, adapted from the single-node
//! backend the teacher ships alongside its Redis-backed cluster variant
//! (this engine has no cluster mode, so only that variant survives).

use crate::domain::ports::resilience::{RateLimitResult, RateLimiterBackend};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct WindowEntry {
    timestamps: Vec<Instant>,
}

/// Sliding-window limiter keyed by caller-supplied string (e.g. `repo:<id>`).
pub struct InMemoryRateLimiter {
    windows: DashMap<String, WindowEntry>,
    max_requests_per_window: u32,
    window: Duration,
    enabled: AtomicBool,
}

impl InMemoryRateLimiter {
    pub fn new(max_requests_per_window: u32, window: Duration, enabled: bool) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests_per_window,
            window,
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn disabled() -> Self {
        Self::new(u32::MAX, Duration::from_secs(1), false)
    }
}

#[async_trait]
impl RateLimiterBackend for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> RateLimitResult {
        if !self.enabled.load(Ordering::Relaxed) {
            return RateLimitResult::allowed();
        }

        let now = Instant::now();
        let cutoff = now - self.window;
        let mut entry = self.windows.entry(key.to_string()).or_insert_with(|| WindowEntry {
            timestamps: Vec::new(),
        });
        entry.timestamps.retain(|&ts| ts > cutoff);

        if entry.timestamps.len() < self.max_requests_per_window as usize {
            entry.timestamps.push(now);
            let remaining = self.max_requests_per_window - entry.timestamps.len() as u32;
            RateLimitResult {
                allowed: true,
                remaining: Some(remaining),
            }
        } else {
            RateLimitResult::denied()
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_the_limit_then_denies() {
        let limiter = InMemoryRateLimiter::new(2, Duration::from_secs(60), true);
        assert!(limiter.check("k").await.allowed);
        assert!(limiter.check("k").await.allowed);
        assert!(!limiter.check("k").await.allowed);
    }

    #[tokio::test]
    async fn disabled_limiter_always_allows() {
        let limiter = InMemoryRateLimiter::disabled();
        for _ in 0..10 {
            assert!(limiter.check("k").await.allowed);
        }
    }
}
