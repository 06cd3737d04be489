//! Rate limiting middleware using a fixed-window counter per client IP.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Body sent with every `429 Too Many Requests` response.
pub const REJECTION_MESSAGE: &str = "Too many requests, please try again later.";

const RATELIMIT: HeaderName = HeaderName::from_static("ratelimit");
const RATELIMIT_POLICY: HeaderName = HeaderName::from_static("ratelimit-policy");

/// Window length and request quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    /// 20 requests per 60 seconds.
    fn default() -> Self {
        Self {
            limit: 20,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct Window {
    hits: u32,
    reset_at: Instant,
}

/// Outcome of counting a single request against its client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

impl Decision {
    /// Seconds until the window resets, rounded up.
    pub fn reset_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Shared per-client counters.
///
/// Cloning is cheap; clones share the same store.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    clients: Arc<DashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            clients: Arc::new(DashMap::new()),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Counts one request from `key` and decides whether it may proceed.
    pub fn hit(&self, key: IpAddr) -> Decision {
        self.hit_at(key, Instant::now())
    }

    /// Same as [`RateLimiter::hit`] with an explicit clock reading.
    ///
    /// The entry guard holds the shard lock, so the reset-and-increment is
    /// atomic with respect to concurrent hits on the same key.
    pub fn hit_at(&self, key: IpAddr, now: Instant) -> Decision {
        let RateLimitPolicy { limit, window } = self.policy;

        let mut entry = self.clients.entry(key).or_insert_with(|| Window {
            hits: 0,
            reset_at: now + window,
        });

        if entry.reset_at <= now {
            entry.hits = 0;
            entry.reset_at = now + window;
        }

        entry.hits = entry.hits.saturating_add(1);

        Decision {
            allowed: entry.hits <= limit,
            limit,
            remaining: limit.saturating_sub(entry.hits),
            reset_after: entry.reset_at.saturating_duration_since(now),
        }
    }

    /// Drops every window that has already elapsed.
    pub fn prune_expired(&self) {
        let now = Instant::now();
        self.clients.retain(|_, window| window.reset_at > now);
    }

    /// Number of clients with a tracked window.
    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }

    /// Writes the draft-7 `RateLimit-Policy` and `RateLimit` headers.
    pub fn write_headers(&self, decision: &Decision, headers: &mut HeaderMap) {
        let policy = format!("{};w={}", decision.limit, self.policy.window.as_secs());
        let state = format!(
            "limit={}, remaining={}, reset={}",
            decision.limit,
            decision.remaining,
            decision.reset_secs()
        );

        if let Ok(value) = HeaderValue::from_str(&policy) {
            headers.insert(RATELIMIT_POLICY, value);
        }
        if let Ok(value) = HeaderValue::from_str(&state) {
            headers.insert(RATELIMIT, value);
        }
    }
}

/// Counts the request against its client's window.
///
/// # Limits
///
/// - **Window**: 60 seconds, starting at the client's first request
/// - **Quota**: 20 requests per window
///
/// Requests over the quota receive `429 Too Many Requests` with a plain-text
/// message and a `Retry-After` header. Every response carries the draft-7
/// `RateLimit` / `RateLimit-Policy` headers.
///
/// # Key Extraction
///
/// Clients are keyed by IP (see [`client_ip`]); requests without a
/// resolvable address share a single bucket.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/health", get(health_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = client_ip(&req, state.behind_proxy).unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    let decision = state.rate_limiter.hit(key);

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");

        let mut rejected = (StatusCode::TOO_MANY_REQUESTS, REJECTION_MESSAGE).into_response();
        if let Ok(value) = HeaderValue::from_str(&decision.reset_secs().to_string()) {
            rejected.headers_mut().insert(header::RETRY_AFTER, value);
        }
        rejected
    };

    state
        .rate_limiter
        .write_headers(&decision, response.headers_mut());

    response
}
