//! 客户端 IP 提取
//!
//! 默认只信任 TCP 连接的对端地址；只有对端是配置中的可信代理（单 IP 或 CIDR）时，
//! 才读取 X-Forwarded-For / X-Real-IP。

use std::net::{IpAddr, SocketAddr};

use actix_web::http::header::HeaderMap;
use tracing::{debug, warn};

/// 无法确定客户端地址时使用的标识
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
enum TrustedProxy {
    Addr(IpAddr),
    Cidr { network: IpAddr, prefix_len: u8 },
}

impl TrustedProxy {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.split_once('/') {
            Some((network, prefix_len)) => {
                let network: IpAddr = network.parse().ok()?;
                let prefix_len: u8 = prefix_len.parse().ok()?;
                let max = if network.is_ipv4() { 32 } else { 128 };
                (prefix_len <= max).then_some(TrustedProxy::Cidr {
                    network,
                    prefix_len,
                })
            }
            None => raw.parse().ok().map(TrustedProxy::Addr),
        }
    }

    fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            TrustedProxy::Addr(addr) => addr == ip,
            TrustedProxy::Cidr {
                network,
                prefix_len,
            } => ip_in_network(ip, network, *prefix_len),
        }
    }
}

fn ip_in_network(ip: &IpAddr, network: &IpAddr, prefix_len: u8) -> bool {
    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            (u32::from(*ip) & mask) == (u32::from(*net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            (u128::from(*ip) & mask) == (u128::from(*net) & mask)
        }
        _ => false,
    }
}

/// 解析 `ip` 或 `ip:port`（含 `[v6]:port`）
fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    raw.parse::<SocketAddr>()
        .map(|addr| addr.ip())
        .or_else(|_| raw.parse::<IpAddr>())
        .ok()
}

/// 客户端 IP 提取策略
#[derive(Debug, Clone, Default)]
pub struct ClientIpPolicy {
    trusted_proxies: Vec<TrustedProxy>,
}

impl ClientIpPolicy {
    /// 无法解析的条目会被忽略并记录警告
    pub fn new(trusted_proxies: &[String]) -> Self {
        let trusted_proxies = trusted_proxies
            .iter()
            .filter_map(|raw| {
                let parsed = TrustedProxy::parse(raw);
                if parsed.is_none() {
                    warn!("Ignoring invalid trusted proxy entry: '{}'", raw);
                }
                parsed
            })
            .collect();
        Self { trusted_proxies }
    }

    pub fn is_trusted_proxy(&self, ip: &IpAddr) -> bool {
        self.trusted_proxies.iter().any(|proxy| proxy.matches(ip))
    }

    /// 根据对端地址和请求头确定客户端 IP（不含端口）
    pub fn client_ip(&self, peer_addr: Option<&str>, headers: &HeaderMap) -> String {
        let Some(peer) = peer_addr.and_then(parse_ip) else {
            return UNKNOWN_CLIENT.to_string();
        };

        if self.is_trusted_proxy(&peer)
            && let Some(forwarded) = forwarded_ip(headers)
        {
            debug!("Trusted proxy {} forwarded client {}", peer, forwarded);
            return forwarded.to_string();
        }

        peer.to_string()
    }
}

/// X-Forwarded-For 的第一个地址，其次 X-Real-IP
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(parse_ip)
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .and_then(parse_ip)
        })
}
