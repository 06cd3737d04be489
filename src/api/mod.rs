//! HTTP API layer.
//!
//! # Modules
//!
//! - [`dto`] - Response bodies
//! - [`handlers`] - Health checks and the 404 fallback
//! - [`middleware`] - Cross-cutting request processing
//! - [`routes`] - Route configuration
//! - [`v1`] - Mount point of the versioned API

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod v1;
