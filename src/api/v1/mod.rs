//! Mount point of the versioned API.
//!
//! The `v1` endpoints live outside this crate. [`routes`] is what the binary
//! mounts under `/api/v1`; embedders pass their own router to
//! [`crate::routes::app_router`] instead.

use axum::Router;

/// Router mounted under `/api/v1`.
///
/// Unmatched paths below the mount fall through to the global 404 handler.
pub fn routes() -> Router {
    Router::new()
}
