//! HTTP middleware for request processing and protection.
//!
//! Provides rate limiting, security headers, CORS, compression, access
//! logging, and panic conversion.

pub mod access_log;
pub mod catch_panic;
pub mod compression;
pub mod cors;
pub mod rate_limit;
pub mod security_headers;
