//! Client IP extraction from HTTP requests.

use axum::http::Request;
use std::net::IpAddr;
use tower_governor::key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor};

/// Resolves the IP address of the client that issued `req`.
///
/// With `behind_proxy` set, [`SmartIpKeyExtractor`] reads `X-Forwarded-For`,
/// `X-Real-IP` and `Forwarded` before the peer address. Otherwise only the
/// peer socket address recorded by `ConnectInfo` is used.
///
/// Returns `None` when no source yields a parsable address, e.g. when the
/// router is served without `into_make_service_with_connect_info`.
pub fn client_ip<B>(req: &Request<B>, behind_proxy: bool) -> Option<IpAddr> {
    let extracted = if behind_proxy {
        SmartIpKeyExtractor.extract(req)
    } else {
        PeerIpKeyExtractor.extract(req)
    };

    extracted.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::HeaderValue;
    use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

    fn request_with(headers: &[(&'static str, &'static str)], peer: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri("/").body(Body::empty()).unwrap();
        for (name, value) in headers {
            req.headers_mut()
                .insert(*name, HeaderValue::from_static(value));
        }
        if let Some(peer) = peer {
            let addr: SocketAddr = peer.parse().unwrap();
            req.extensions_mut().insert(ConnectInfo(addr));
        }
        req
    }

    #[test]
    fn test_peer_address_used_by_default() {
        let req = request_with(&[("x-forwarded-for", "10.0.0.1")], Some("192.168.1.7:51234"));

        let ip = client_ip(&req, false);
        assert_eq!(ip, Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 7))));
    }

    #[test]
    fn test_forwarded_for_behind_proxy() {
        let req = request_with(
            &[("x-forwarded-for", "203.0.113.9, 10.0.0.1")],
            Some("127.0.0.1:40000"),
        );

        let ip = client_ip(&req, true);
        assert_eq!(ip, Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9))));
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = request_with(&[("x-real-ip", "198.51.100.4")], None);

        let ip = client_ip(&req, true);
        assert_eq!(ip, Some(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 4))));
    }

    #[test]
    fn test_invalid_forwarded_header_falls_back_to_peer() {
        let req = request_with(&[("x-forwarded-for", "garbage")], Some("127.0.0.1:40000"));

        let ip = client_ip(&req, true);
        assert_eq!(ip, Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));
    }

    #[test]
    fn test_forwarded_ipv6() {
        let req = request_with(&[("x-forwarded-for", "::1")], None);

        let ip = client_ip(&req, true);
        assert_eq!(ip, Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
    }

    #[test]
    fn test_no_source_yields_none() {
        let req = request_with(&[], None);

        assert_eq!(client_ip(&req, false), None);
        assert_eq!(client_ip(&req, true), None);
    }
}
