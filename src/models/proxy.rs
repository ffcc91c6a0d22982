use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Proxy protocol type
///
/// The set of upstream kinds the mihomo runtime accepts. An unknown kind in
/// a subscription document is a deserialization error, not a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    Ss,
    Ssr,
    Vmess,
    Vless,
    Trojan,
    Hysteria,
    Hysteria2,
    Tuic,
    Snell,
    Wireguard,
    Http,
    Socks5,
}

impl ProxyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyKind::Ss => "ss",
            ProxyKind::Ssr => "ssr",
            ProxyKind::Vmess => "vmess",
            ProxyKind::Vless => "vless",
            ProxyKind::Trojan => "trojan",
            ProxyKind::Hysteria => "hysteria",
            ProxyKind::Hysteria2 => "hysteria2",
            ProxyKind::Tuic => "tuic",
            ProxyKind::Snell => "snell",
            ProxyKind::Wireguard => "wireguard",
            ProxyKind::Http => "http",
            ProxyKind::Socks5 => "socks5",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ss" => Some(ProxyKind::Ss),
            "ssr" => Some(ProxyKind::Ssr),
            "vmess" => Some(ProxyKind::Vmess),
            "vless" => Some(ProxyKind::Vless),
            "trojan" => Some(ProxyKind::Trojan),
            "hysteria" => Some(ProxyKind::Hysteria),
            "hysteria2" => Some(ProxyKind::Hysteria2),
            "tuic" => Some(ProxyKind::Tuic),
            "snell" => Some(ProxyKind::Snell),
            "wireguard" => Some(ProxyKind::Wireguard),
            "http" => Some(ProxyKind::Http),
            "socks5" => Some(ProxyKind::Socks5),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One upstream proxy as described by a subscription document.
///
/// The identity and protocol fields the pool inspects are statically typed;
/// everything else a descriptor carries (credentials, transport options,
/// protocol-specific tuning) lands in `extra` and is re-emitted unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    pub name: String,
    pub server: String,
    pub port: u16,
    #[serde(rename = "type")]
    pub kind: ProxyKind,
    /// Flow-control mode (vless); the runtime only supports a subset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    /// Cipher suite (shadowsocks-family)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cipher: Option<String>,
    /// Failure count set by an external health check on a prior snapshot.
    /// Bookkeeping only, never re-emitted into the runtime config.
    #[serde(default, skip_serializing)]
    pub fail_count: u32,
    /// Opaque pass-through fields the pool does not interpret
    #[serde(flatten)]
    pub extra: Mapping,
}

impl ProxyDescriptor {
    /// Stable identity of the upstream, independent of its display name
    pub fn endpoint_key(&self) -> EndpointKey {
        EndpointKey {
            server: self.server.clone(),
            port: self.port,
        }
    }
}

/// The `(server, port)` pair identifying a proxy independent of display name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    pub server: String,
    pub port: u16,
}

impl std::fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.server, self.port)
    }
}
