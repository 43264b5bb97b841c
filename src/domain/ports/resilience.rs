//! Circuit breaker and rate limiter backend contracts.
//!
//! Pluggable so a single-process deployment can use an in-memory backend
//! while a clustered deployment could share state externally; the
//! Dispatcher only depends on these traits.

use async_trait::async_trait;
use std::fmt;

/// Circuit breaker state (closed = allowing calls, open = rejecting,
/// half-open = probing with a single trial call).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitBreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Per-plugin (or per-dependency) circuit breaker.
#[async_trait]
pub trait CircuitBreakerBackend: Send + Sync {
    /// Whether a call should be attempted right now.
    async fn is_call_permitted(&self) -> bool;

    /// Record a successful call, possibly closing the breaker.
    async fn record_success(&self);

    /// Record a failed call, possibly opening the breaker.
    async fn record_failure(&self);

    /// Current state, for diagnostics.
    async fn state(&self) -> CircuitBreakerState;

    /// Name used in logs and metrics.
    fn name(&self) -> &str;
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Remaining permits in the current window, if the backend tracks one.
    pub remaining: Option<u32>,
}

impl RateLimitResult {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            remaining: None,
        }
    }

    pub fn denied() -> Self {
        Self {
            allowed: false,
            remaining: Some(0),
        }
    }
}

/// Rate limiter keyed by an arbitrary string (repository id, plugin id, ...).
#[async_trait]
pub trait RateLimiterBackend: Send + Sync {
    /// Check and consume one permit for `key`.
    async fn check(&self, key: &str) -> RateLimitResult;

    /// Whether the limiter is active (disabled limiters always allow).
    fn is_enabled(&self) -> bool;
}
