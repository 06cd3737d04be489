mod common;

use axum::http::{HeaderMap, HeaderValue};
use axum::{Router, routing::get};
use learnify_backend::api::middleware::security_headers::SECURITY_HEADERS;

fn assert_security_headers(headers: &HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        assert_eq!(headers.get(name).map(|v| v.to_str().unwrap()), Some(value), "{name}");
    }
    assert!(headers.get("x-powered-by").is_none());
}

async fn powered_by_handler() -> ([(&'static str, HeaderValue); 1], &'static str) {
    (
        [("x-powered-by", HeaderValue::from_static("Express"))],
        "legacy",
    )
}

#[tokio::test]
async fn test_headers_on_success() {
    let server = common::server();

    let response = server.get("/api/health").await;

    response.assert_status_ok();
    assert_security_headers(response.headers());
    assert_eq!(
        response.headers()["strict-transport-security"],
        "max-age=15552000; includeSubDomains"
    );
}

#[tokio::test]
async fn test_headers_on_not_found() {
    let server = common::server();

    let response = server.get("/missing").await;

    response.assert_status_not_found();
    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_headers_on_internal_error() {
    let server = common::proxied_server(common::failing_v1());

    let response = server.get("/api/v1/panic").await;

    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_powered_by_is_stripped() {
    let v1 = Router::new().route("/legacy", get(powered_by_handler));
    let server = common::proxied_server(v1);

    let response = server.get("/api/v1/legacy").await;

    response.assert_status_ok();
    response.assert_text("legacy");
    assert_security_headers(response.headers());
}
