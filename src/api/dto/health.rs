//! DTOs for health check endpoints.

use serde::Serialize;

/// Health check response: `{"health":"OK"}`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub health: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { health: "OK" }
    }
}
