//! API route configuration.

use crate::api::handlers::{health_handler, not_found_handler};
use axum::{Router, routing::get};

/// Routes served under `/api`.
///
/// # Endpoints
///
/// - `GET /`        - Health check
/// - `GET /health`  - Health check
/// - `/v1/*`        - Delegated to the versioned router
///
/// Other methods on the health paths are answered like unknown paths.
pub fn api_routes(v1: Router) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .method_not_allowed_fallback(not_found_handler)
        .nest("/v1", v1)
}
