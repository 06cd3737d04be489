//! HTTPS server initialization and runtime setup.
//!
//! Handles TLS loading, middleware state, background maintenance, and the
//! server lifecycle.

use crate::api;
use crate::config::Config;
use crate::routes::{App, app_router};
use crate::state::AppState;
use crate::tls::load_tls_config;

use anyhow::Result;
use axum::body::{Body, Bytes, HttpBody};
use axum::extract::connect_info::IntoMakeServiceWithConnectInfo;
use axum::{BoxError, ServiceExt};
use axum::extract::Request;
use axum_server::Handle;
use std::net::SocketAddr;
use tower::util::MapRequest;
use std::time::Duration;

/// Time in-flight requests get to finish after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Runs the HTTPS server with the given configuration.
///
/// Initializes:
/// - TLS certificate pair
/// - Rate limiter and its pruning task
/// - Axum router with the full middleware stack
/// - HTTPS server (HTTP/2 with HTTP/1.1 fallback)
///
/// # Errors
///
/// Returns an error if:
/// - The certificate or key is missing or invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let tls = load_tls_config(&config.cert_path(), &config.key_path()).await?;
    tracing::info!("TLS certificate loaded from {}", config.cert_dir.display());

    let state = AppState::with_default_policy(config.behind_proxy);
    tokio::spawn(prune_rate_limits(state.clone()));

    let app = app_router(state, api::v1::routes());

    let handle = Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    let addr = config.listen_addr();
    tracing::info!("Server is starting: https://localhost:{}", config.port);

    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(with_connect_info(app))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Adapts the transport's request body to axum's `Body` and attaches the
/// peer address, the same way `axum::serve` does.
#[allow(clippy::type_complexity)]
fn with_connect_info<B>(
    app: App,
) -> IntoMakeServiceWithConnectInfo<MapRequest<App, fn(Request<B>) -> Request>, SocketAddr>
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let to_axum_body: fn(Request<B>) -> Request = |req| req.map(Body::new);
    ServiceExt::<Request<B>>::into_make_service_with_connect_info::<SocketAddr>(
        tower::ServiceExt::<Request>::map_request(app, to_axum_body),
    )
}

/// Periodically drops elapsed rate-limit windows.
async fn prune_rate_limits(state: AppState) {
    let mut interval = tokio::time::interval(state.rate_limiter.policy().window);
    loop {
        interval.tick().await;
        state.rate_limiter.prune_expired();
        tracing::debug!(
            clients = state.rate_limiter.tracked_clients(),
            "Pruned rate limit windows"
        );
    }
}

async fn shutdown_on_ctrl_c(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }

    tracing::info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
