//! Server configuration.

use std::time::Duration;

use webflow_settings::{PortRange, ServerSettings};

/// Configuration for the bridge server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Bind the first free port in this range instead of `port`.
    pub port_range: Option<PortRange>,
    /// Externally reachable base URL, if not the bind address.
    pub public_url: Option<String>,
    /// Interval between server-initiated Ping frames.
    pub heartbeat_interval: Duration,
    /// Disconnect a socket silent for longer than this.
    pub heartbeat_timeout: Duration,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Outbound frames buffered per socket.
    pub send_buffer: usize,
}

impl ServerConfig {
    /// Build from loaded settings.
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            port_range: settings.port_range,
            public_url: settings.public_url.clone(),
            heartbeat_interval: Duration::from_millis(settings.heartbeat_interval_ms),
            heartbeat_timeout: Duration::from_millis(settings.heartbeat_timeout_ms),
            max_message_size: settings.max_message_size,
            send_buffer: settings.send_buffer,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            port_range: None,
            public_url: None,
            heartbeat_interval: Duration::from_secs(30),
            heartbeat_timeout: Duration::from_secs(60),
            max_message_size: 16 * 1024 * 1024,
            send_buffer: 256,
        }
    }
}
