//! Client identity for admission control
//!
//! The admission key is the peer address, unless the peer is a proxy we
//! trust, in which case the first `X-Forwarded-For` hop (or `X-Real-IP`)
//! is used. With no proxies configured, private and loopback peers are
//! assumed to be proxies.

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

/// Key used when no address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ProxyRule {
    Addr(IpAddr),
    Cidr { network: IpAddr, prefix: u8 },
}

impl ProxyRule {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.split_once('/') {
            Some((network, prefix)) => {
                let network: IpAddr = network.parse().ok()?;
                let prefix: u8 = prefix.parse().ok()?;
                let max = if network.is_ipv4() { 32 } else { 128 };
                (prefix <= max).then_some(ProxyRule::Cidr { network, prefix })
            }
            None => raw.parse().ok().map(ProxyRule::Addr),
        }
    }

    fn matches(&self, ip: &IpAddr) -> bool {
        match (self, ip) {
            (ProxyRule::Addr(addr), ip) => addr == ip,
            (ProxyRule::Cidr { network: IpAddr::V4(net), prefix }, IpAddr::V4(ip)) => {
                let mask = u32::MAX.checked_shl(32 - *prefix as u32).unwrap_or(0);
                (u32::from(*ip) & mask) == (u32::from(*net) & mask)
            }
            (ProxyRule::Cidr { network: IpAddr::V6(net), prefix }, IpAddr::V6(ip)) => {
                let mask = u128::MAX.checked_shl(128 - *prefix as u32).unwrap_or(0);
                (u128::from(*ip) & mask) == (u128::from(*net) & mask)
            }
            _ => false,
        }
    }
}

/// Parsed `server.trusted_proxies`.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies {
    rules: Vec<ProxyRule>,
}

impl TrustedProxies {
    /// Entries that are neither an address nor a CIDR block are skipped.
    pub fn new(entries: &[String]) -> Self {
        let rules = entries
            .iter()
            .filter_map(|entry| {
                let rule = ProxyRule::parse(entry);
                if rule.is_none() {
                    debug!("Ignoring invalid trusted proxy entry: {}", entry);
                }
                rule
            })
            .collect();
        Self { rules }
    }

    fn trusts(&self, peer: &IpAddr) -> bool {
        if self.rules.is_empty() {
            return is_private_or_local(peer);
        }
        self.rules.iter().any(|rule| rule.matches(peer))
    }

    /// Resolve the admission key from the peer address and request headers.
    pub fn client_ip(&self, peer: Option<&str>, headers: &HeaderMap) -> String {
        let Some(peer) = peer else {
            return forwarded_ip(headers).unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
        };
        let peer_ip = peer
            .parse::<SocketAddr>()
            .map(|s| s.ip())
            .or_else(|_| peer.parse::<IpAddr>());

        match peer_ip {
            Ok(ip) if self.trusts(&ip) => forwarded_ip(headers).unwrap_or_else(|| ip.to_string()),
            Ok(ip) => ip.to_string(),
            Err(_) => peer.to_string(),
        }
    }

    pub fn client_ip_of(&self, req: &HttpRequest) -> String {
        let conn = req.connection_info();
        self.client_ip(conn.peer_addr(), req.headers())
    }
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`.
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .map(String::from)
}
