//! Response compression with a per-request opt-out.

use axum::{
    extract::Request,
    http::{HeaderName, header},
    middleware::Next,
    response::Response,
};
use tower_http::compression::{
    CompressionLayer,
    predicate::{And, NotForContentType, Predicate, SizeAbove},
};

/// Request header that disables compression of the response.
pub const NO_COMPRESSION: HeaderName = HeaderName::from_static("x-no-compression");

/// Bodies smaller than this are sent as-is.
pub const MIN_COMPRESS_SIZE: u16 = 1024;

pub type CompressWhen =
    And<And<And<SizeAbove, NotForContentType>, NotForContentType>, NotForContentType>;

/// Creates the compression layer (gzip, brotli, deflate).
///
/// Responses are compressed when the client accepts an encoding, the body is
/// at least [`MIN_COMPRESS_SIZE`] bytes, and the content is not an image, a
/// gRPC message, or an event stream.
pub fn layer() -> CompressionLayer<CompressWhen> {
    let predicate = SizeAbove::new(MIN_COMPRESS_SIZE)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::GRPC)
        .and(NotForContentType::SSE);

    CompressionLayer::new().compress_when(predicate)
}

/// Honors the `x-no-compression` request header.
///
/// Must run outside [`layer`]: it drops `Accept-Encoding` so the compression
/// layer negotiates the identity encoding.
pub async fn opt_out(mut req: Request, next: Next) -> Response {
    if req.headers().contains_key(NO_COMPRESSION) {
        req.headers_mut().remove(header::ACCEPT_ENCODING);
    }

    next.run(req).await
}
