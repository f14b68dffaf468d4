use actix_web::dev::{Payload, ServiceRequest};
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::error::AppError;

const CF_CONNECTING_IP: &str = "cf-connecting-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";
const LOOPBACK: &str = "127.0.0.1";

/// Address of the client that made the request, as seen through the proxy
/// chain. Stamped on login logs and OTP rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Cloudflare header first, then the first `X-Forwarded-For` hop, then the
/// socket peer. Empty or IPv6 loopback collapses to `127.0.0.1`.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<&str>) -> ClientIp {
    let raw = header_str(headers, CF_CONNECTING_IP)
        .or_else(|| {
            header_str(headers, X_FORWARDED_FOR)
                .and_then(|list| list.split(',').next())
                .map(str::trim)
                .filter(|first| !first.is_empty())
        })
        .or(peer)
        .unwrap_or_default();

    match raw {
        "" | "::1" => ClientIp(LOOPBACK.to_string()),
        ip => ClientIp(ip.to_string()),
    }
}

pub(crate) fn peer_of(req: &HttpRequest) -> Option<String> {
    req.peer_addr().map(|addr| addr.ip().to_string())
}

/// Resolve the address for a request entering the middleware chain.
pub fn client_ip_of(req: &ServiceRequest) -> ClientIp {
    let peer = req.peer_addr().map(|addr| addr.ip().to_string());
    resolve_client_ip(req.headers(), peer.as_deref())
}

impl FromRequest for ClientIp {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let ip = req
            .extensions()
            .get::<ClientIp>()
            .cloned()
            .unwrap_or_else(|| resolve_client_ip(req.headers(), peer_of(req).as_deref()));
        ready(Ok(ip))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::{HeaderName, HeaderValue};

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        map
    }

    #[test]
    fn cloudflare_header_wins() {
        let h = headers(&[
            ("cf-connecting-ip", "203.0.113.7"),
            ("x-forwarded-for", "198.51.100.1, 10.0.0.1"),
        ]);
        assert_eq!(resolve_client_ip(&h, Some("10.0.0.2")).as_str(), "203.0.113.7");
    }

    #[test]
    fn first_forwarded_hop_is_used() {
        let h = headers(&[("x-forwarded-for", " 198.51.100.1 , 10.0.0.1")]);
        assert_eq!(resolve_client_ip(&h, Some("10.0.0.2")).as_str(), "198.51.100.1");
    }

    #[test]
    fn peer_is_the_fallback() {
        assert_eq!(
            resolve_client_ip(&HeaderMap::new(), Some("192.0.2.5")).as_str(),
            "192.0.2.5"
        );
    }

    #[test]
    fn loopback_and_missing_become_ipv4_loopback() {
        assert_eq!(resolve_client_ip(&HeaderMap::new(), Some("::1")).as_str(), "127.0.0.1");
        assert_eq!(resolve_client_ip(&HeaderMap::new(), None).as_str(), "127.0.0.1");
        let h = headers(&[("x-forwarded-for", ",")]);
        assert_eq!(resolve_client_ip(&h, None).as_str(), "127.0.0.1");
    }
}
