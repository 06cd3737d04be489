//! Top-level router: route tree plus the middleware stack.
//!
//! # Route Structure
//!
//! - `GET  /api`         - Health check
//! - `GET  /api/health`  - Health check
//! - `/api/v1/*`         - Versioned API (mounted router)
//! - anything else       - `404 {"error":"Not Found"}`
//!
//! # Middleware (outermost first)
//!
//! 1. **Path normalization** - Trailing slash handling, after the received URI
//!    is recorded for the access log
//! 2. **Compression** - gzip/br/deflate unless `x-no-compression` is sent
//! 3. **Body limit** - JSON and form bodies capped at 100 KiB
//! 4. **Rate limiting** - 20 requests per 60 s per client IP
//! 5. **Security headers** - CSP, HSTS, referrer policy, ...
//! 6. **CORS** - Any origin, preflight answered in place
//! 7. **Access log** - One line per completed request
//! 8. **Panic conversion** - Handler panics become `500`

use crate::api;
use crate::api::handlers::not_found_handler;
use crate::api::middleware::{
    access_log, catch_panic, compression, cors, rate_limit, security_headers,
};
use crate::state::AppState;
use axum::extract::{DefaultBodyLimit, Request};
use axum::{Router, middleware};
use tower::Layer;
use tower::util::{MapRequest, MapRequestLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Maximum accepted request body size.
pub const BODY_LIMIT: usize = 100 * 1024;

/// The fully layered application service.
pub type App = MapRequest<NormalizePath<Router>, fn(Request) -> Request>;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - rate limiter and client IP settings shared by the middleware
/// - `v1` - router mounted under `/api/v1`
pub fn app_router(state: AppState, v1: Router) -> App {
    let router = Router::new()
        .nest("/api", api::routes::api_routes(v1))
        .fallback(not_found_handler)
        .layer(catch_panic::layer())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access_log::layer,
        ))
        .layer(cors::layer())
        .layer(middleware::from_fn(security_headers::layer))
        .layer(middleware::from_fn_with_state(state, rate_limit::layer))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(compression::layer())
        .layer(middleware::from_fn(compression::opt_out));

    let normalized = NormalizePathLayer::trim_trailing_slash().layer(router);
    MapRequestLayer::new(access_log::remember_uri as fn(Request) -> Request).layer(normalized)
}
