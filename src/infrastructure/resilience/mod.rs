//! Concrete resilience backends for the domain ports in
//! `domain::ports::resilience`. The circuit breaker used by the Dispatcher
//! lives alongside it in `application::dispatcher` (it is dispatcher-internal
//! state, keyed per plugin id); this module holds the request-facing rate
//! limiter, which is a cross-cutting concern applied at the `Handler`
//! boundary rather than per plugin.

pub mod rate_limiter;

pub use rate_limiter::InMemoryRateLimiter;
