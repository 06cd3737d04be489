//! # Learnify Backend
//!
//! HTTPS / HTTP2 edge of the Learnify backend built with Axum.
//!
//! The crate owns no business logic: it terminates TLS, runs every request
//! through a fixed middleware stack, answers health checks, and mounts the
//! versioned API router under `/api/v1`.
//!
//! ## Architecture
//!
//! - **Bootstrap** ([`config`], [`logging`], [`tls`], [`server`]) - Startup and server lifecycle
//! - **Routing** ([`routes`], [`api`]) - Route tree, handlers, and middleware
//! - **Errors** ([`error`]) - JSON error envelope
//!
//! ## Features
//!
//! - HTTP/2 with HTTP/1.1 fallback over rustls
//! - Fixed-window rate limiting with draft-7 `RateLimit` headers
//! - Security headers, permissive CORS, opt-out compression
//! - Access log and JSON log files with daily rotation
//!
//! ## Quick Start
//!
//! ```bash
//! # Certificate pair expected in ./cert
//! openssl req -x509 -newkey rsa:2048 -nodes -days 365 \
//!     -keyout cert/server.key -out cert/server.cert -subj "/CN=localhost"
//!
//! # Start the service on https://localhost:5000
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod error;
pub mod logging;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;
pub mod tls;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::api::middleware::rate_limit::{RateLimitPolicy, RateLimiter};
    pub use crate::error::AppError;
    pub use crate::routes::app_router;
    pub use crate::state::AppState;
}
