use serde::{Deserialize, Serialize};

/// Local listener type
///
/// The pool only generates `mixed` (HTTP + SOCKS on one port) listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListenerKind {
    #[default]
    Mixed,
}

impl ListenerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerKind::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One generated local listener, forwarding through exactly one upstream.
///
/// Created 1:1 with surviving proxy descriptors; the name is derived from
/// the assigned port alone, so unique ports give unique names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ListenerKind,
    pub port: u16,
    /// Name of the upstream proxy this listener forwards through
    pub proxy: String,
}

impl ListenerDescriptor {
    /// Create a listener on `port` forwarding through the named upstream
    pub fn new(port: u16, upstream_name: impl Into<String>) -> Self {
        Self {
            name: format!("mixed{}", port),
            kind: ListenerKind::Mixed,
            port,
            proxy: upstream_name.into(),
        }
    }
}
