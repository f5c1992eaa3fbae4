//! Bridge hosting settings.

use serde::{Deserialize, Serialize};

/// Which transport variant hosts the Designer bridge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BridgeMode {
    /// One process, sockets grouped by `?siteId=` query parameter.
    #[default]
    Local,
    /// One actor per site, sockets admitted by bearer token.
    MultiTenant,
}

impl BridgeMode {
    /// Parse `local` / `multi-tenant` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "multi-tenant" | "multitenant" | "tenant" => Some(Self::MultiTenant),
            _ => None,
        }
    }
}

/// Inclusive range of ports to try when binding the local bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    /// First port tried.
    pub start: u16,
    /// Last port tried.
    pub end: u16,
}

impl PortRange {
    /// Parse `start-end`.
    pub fn parse(s: &str) -> Option<Self> {
        let (start, end) = s.split_once('-')?;
        let start: u16 = start.trim().parse().ok()?;
        let end: u16 = end.trim().parse().ok()?;
        (start >= 1 && start <= end).then_some(Self { start, end })
    }

    /// Ports in the range, in order.
    pub fn ports(self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

/// Server network and socket settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` auto-assigns). Ignored when `port_range` is set.
    pub port: u16,
    /// Try each port in turn and bind the first free one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range: Option<PortRange>,
    /// Transport variant.
    pub mode: BridgeMode,
    /// Externally reachable base URL handed to the Designer, if it differs
    /// from the bind address (e.g. behind a proxy).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    /// Interval between server-initiated Ping frames, in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Disconnect a socket silent for longer than this, in milliseconds.
    pub heartbeat_timeout_ms: u64,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Outbound frames buffered per socket before frames are dropped.
    pub send_buffer: usize,
}

/// Lowest accepted heartbeat interval or timeout, in milliseconds.
pub const HEARTBEAT_MS_MIN: u64 = 1_000;

/// Highest accepted heartbeat interval or timeout, in milliseconds.
pub const HEARTBEAT_MS_MAX: u64 = 600_000;

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1338,
            port_range: None,
            mode: BridgeMode::Local,
            public_url: None,
            heartbeat_interval_ms: 30_000,
            heartbeat_timeout_ms: 60_000,
            max_message_size: 16 * 1024 * 1024,
            send_buffer: 256,
        }
    }
}
