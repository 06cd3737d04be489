#![allow(dead_code)]

use axum::ServiceExt;
use axum::extract::Request;
use axum::{Router, routing::get};
use axum_test::TestServer;
use learnify_backend::api::v1;
use learnify_backend::prelude::*;
use std::net::SocketAddr;

/// Serves the full middleware stack over a real HTTP transport so the peer
/// address is available to the rate limiter and access log.
pub fn server_with(state: AppState, v1: Router) -> TestServer {
    let app = app_router(state, v1);

    TestServer::builder()
        .http_transport()
        .build(ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app))
        .unwrap()
}

/// Default policy, peer address as the client key, empty v1 mount.
pub fn server() -> TestServer {
    server_with(AppState::with_default_policy(false), v1::routes())
}

/// Default policy with client IPs taken from `X-Forwarded-For`.
pub fn proxied_server(v1: Router) -> TestServer {
    server_with(AppState::with_default_policy(true), v1)
}

/// A v1 router with one route per failure mode exercised by the tests.
pub fn failing_v1() -> Router {
    Router::new()
        .route("/error", get(error_handler))
        .route("/panic", get(panic_handler))
}

async fn error_handler() -> Result<&'static str, AppError> {
    Err(AppError::internal(anyhow::anyhow!("upstream unavailable")))
}

async fn panic_handler() -> &'static str {
    panic!("handler exploded")
}
