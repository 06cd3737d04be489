//! Handler for health check endpoints.

use axum::Json;

use crate::api::dto::health::HealthResponse;

/// Reports that the server is up.
///
/// # Endpoints
///
/// - `GET /api`
/// - `GET /api/health`
///
/// Always responds `200 OK` with `{"health":"OK"}`; query parameters and
/// headers are ignored.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
