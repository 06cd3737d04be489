//! Helpers shared by the middleware stack.
//!
//! - [`client_ip`] - Client IP resolution from proxy headers or the peer address

pub mod client_ip;
