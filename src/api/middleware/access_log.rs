//! Per-request access log line.

use axum::{
    body::HttpBody,
    extract::{Request, State},
    http::{Uri, header},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};

use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Placeholder for values that could not be determined.
const UNKNOWN: &str = "N/A";

/// Request URI as received, before trailing-slash normalization.
#[derive(Debug, Clone)]
pub struct ReceivedUri(pub Uri);

/// Stores the incoming URI in the request extensions as [`ReceivedUri`].
///
/// Must run outside `NormalizePathLayer` so the logged URL is the one the
/// client sent.
pub fn remember_uri(mut req: Request) -> Request {
    let uri = req.uri().clone();
    req.extensions_mut().insert(ReceivedUri(uri));
    req
}

/// Logs one `INFO` line per completed request.
///
/// # Format
///
/// ```text
/// IP: 203.0.113.9 GET /api/health?verbose=1 status: 200 length: 15 bytes 0.412 ms
/// ```
///
/// The length is taken from `Content-Length`, then from the exact body size;
/// it is `0` when neither is known. A missing client IP is logged as `N/A`.
pub async fn layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();

    let ip = client_ip(&req, state.behind_proxy)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());
    let method = req.method().to_string();
    let uri = req
        .extensions()
        .get::<ReceivedUri>()
        .map(|ReceivedUri(uri)| uri)
        .unwrap_or(req.uri());
    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let response = next.run(req).await;

    tracing::info!(
        "{}",
        format_line(
            &ip,
            &method,
            &url,
            response.status().as_u16(),
            &content_length(&response),
            start.elapsed(),
        )
    );

    response
}

fn content_length(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| response.body().size_hint().exact().map(|n| n.to_string()))
        .unwrap_or_else(|| "0".to_string())
}

fn format_line(
    ip: &str,
    method: &str,
    url: &str,
    status: u16,
    length: &str,
    elapsed: Duration,
) -> String {
    format!(
        "IP: {ip} {method} {url} status: {status} length: {length} bytes {ms:.3} ms",
        ms = elapsed.as_secs_f64() * 1000.0,
    )
}
