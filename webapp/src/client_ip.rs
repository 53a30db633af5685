use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Address the login throttle keys on.
///
/// Forwarding headers are only honoured when the socket peer is one of
/// `trusted`. `X-Forwarded-For` is then read right to left, skipping
/// trusted hops, because a proxy appends the address it saw and anything
/// to the left of that came from the client.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trusted: &[IpAddr]) -> String {
    let Some(peer) = peer.map(|addr| addr.ip()) else {
        return "unknown".to_string();
    };
    if !trusted.contains(&peer) {
        return peer.to_string();
    }

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.rsplit(',')
                .map(str::trim)
                .filter(|hop| !hop.is_empty())
                .find(|hop| hop.parse::<IpAddr>().map_or(true, |ip| !trusted.contains(&ip)))
        });
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    peer.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn proxy() -> Option<SocketAddr> {
        Some("10.0.0.9:51234".parse().unwrap())
    }

    fn trusted() -> Vec<IpAddr> {
        vec!["10.0.0.9".parse().unwrap(), "10.0.0.1".parse().unwrap()]
    }

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn spoofed_forwarded_entries_do_not_change_the_key() {
        let first = client_ip(&forwarded("1.1.1.1, 198.51.100.7"), proxy(), &trusted());
        let second = client_ip(&forwarded("2.2.2.2, 198.51.100.7"), proxy(), &trusted());
        assert_eq!(first, "198.51.100.7");
        assert_eq!(second, "198.51.100.7");
    }

    #[test]
    fn skips_trusted_hops() {
        let headers = forwarded("203.0.113.7, 10.0.0.1");
        assert_eq!(client_ip(&headers, proxy(), &trusted()), "203.0.113.7");
    }

    #[test]
    fn headers_ignored_from_untrusted_peer() {
        let mut headers = forwarded("203.0.113.7");
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        let direct = Some("192.0.2.44:40000".parse().unwrap());
        assert_eq!(client_ip(&headers, direct, &trusted()), "192.0.2.44");
    }

    #[test]
    fn falls_back_to_real_ip_then_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static(" 198.51.100.2 "));
        assert_eq!(client_ip(&headers, proxy(), &trusted()), "198.51.100.2");

        assert_eq!(client_ip(&HeaderMap::new(), proxy(), &trusted()), "10.0.0.9");
        assert_eq!(client_ip(&HeaderMap::new(), None, &trusted()), "unknown");
    }

    #[test]
    fn blank_forwarded_header_falls_through() {
        assert_eq!(client_ip(&forwarded(" , "), proxy(), &trusted()), "10.0.0.9");
    }
}
