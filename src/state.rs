use crate::api::middleware::rate_limit::{RateLimitPolicy, RateLimiter};

/// Handles shared by the middleware stack.
///
/// Constructed once at startup and passed to the stateful layers with
/// `middleware::from_fn_with_state`.
#[derive(Clone, Debug)]
pub struct AppState {
    pub rate_limiter: RateLimiter,
    /// Resolve client IPs from proxy headers instead of the peer address.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(rate_limiter: RateLimiter, behind_proxy: bool) -> Self {
        Self {
            rate_limiter,
            behind_proxy,
        }
    }

    /// State with the default 20 requests / 60 seconds policy.
    pub fn with_default_policy(behind_proxy: bool) -> Self {
        Self::new(RateLimiter::new(RateLimitPolicy::default()), behind_proxy)
    }
}
