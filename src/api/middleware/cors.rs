//! Cross-origin resource sharing policy.

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Methods a cross-origin caller may use.
pub const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// Creates the CORS layer.
///
/// # Policy
///
/// - **Origins**: any (`Access-Control-Allow-Origin: *`)
/// - **Methods**: `GET`, `POST`, `PUT`, `DELETE`
/// - **Headers**: any (`Access-Control-Allow-Headers: *`)
///
/// Preflight requests are answered by the layer itself and never reach the
/// router.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(Any)
}
