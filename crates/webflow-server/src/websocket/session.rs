//! Designer socket lifecycle, from upgrade through disconnect.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use webflow_bridge::{Bridge, Peer};
use webflow_core::{PeerId, SiteId};
use webflow_settings::HEARTBEAT_MS_MIN;

use super::connection::DesignerConnection;
use crate::config::ServerConfig;

/// Per-socket knobs.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Interval between server-initiated Ping frames.
    pub heartbeat_interval: Duration,
    /// Disconnect a socket silent for longer than this.
    pub heartbeat_timeout: Duration,
    /// Outbound frames buffered before sends start failing.
    pub send_buffer: usize,
}

impl SessionConfig {
    /// Derive from the server configuration.
    ///
    /// The ping interval is floored at one second and the silence timeout
    /// is never shorter than the interval.
    pub fn from_server(config: &ServerConfig) -> Self {
        let heartbeat_interval = config
            .heartbeat_interval
            .max(Duration::from_millis(HEARTBEAT_MS_MIN));
        Self {
            heartbeat_interval,
            heartbeat_timeout: config.heartbeat_timeout.max(heartbeat_interval),
            send_buffer: config.send_buffer.max(1),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_server(&ServerConfig::default())
    }
}

/// Serve one Designer socket registered under `site`.
///
/// 1. Registers the socket with `bridge` (which queues the confirmation frame)
/// 2. Forwards queued frames to the socket and pings it periodically
/// 3. Routes inbound text and UTF-8 binary frames through the bridge
/// 4. Unregisters on close, error, heartbeat timeout, or shutdown
#[instrument(skip_all, fields(site_id = %site))]
pub async fn run_designer_session(
    ws: WebSocket,
    site: SiteId,
    bridge: Arc<Bridge>,
    config: SessionConfig,
    shutdown: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(config.send_buffer);
    let connection = Arc::new(DesignerConnection::new(PeerId::new(), site.clone(), send_tx));
    let peer_id = connection.id().clone();

    let started = Instant::now();
    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);

    bridge.on_connect(&site, connection.clone());

    let writer_conn = connection.clone();
    let mut outbound = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(config.heartbeat_interval);
        let _ = ping_interval.tick().await;

        loop {
            tokio::select! {
                frame = send_rx.recv() => {
                    let Some(frame) = frame else { break };
                    if ws_tx.send(Message::Text(String::clone(&frame).into())).await.is_err() {
                        break;
                    }
                }
                _ = ping_interval.tick() => {
                    if !writer_conn.check_alive() && writer_conn.idle_for() > config.heartbeat_timeout {
                        warn!(timeout = ?config.heartbeat_timeout, "designer unresponsive, disconnecting");
                        break;
                    }
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    loop {
        let next = tokio::select! {
            next = ws_rx.next() => next,
            _ = &mut outbound => {
                debug!(peer_id = %peer_id, "writer finished");
                break;
            }
            () = shutdown.cancelled() => {
                debug!(peer_id = %peer_id, "shutting down designer session");
                break;
            }
        };
        let Some(Ok(msg)) = next else { break };
        connection.mark_alive();

        let text = match msg {
            Message::Text(ref t) => Some(t.to_string()),
            Message::Binary(ref data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    Some(s.to_owned())
                } else {
                    debug!(peer_id = %peer_id, len = data.len(), "ignoring non-UTF8 binary frame");
                    None
                }
            }
            Message::Close(_) => {
                debug!(peer_id = %peer_id, "designer sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => None,
        };

        let Some(text) = text else { continue };
        let _ = bridge.on_message(&peer_id, &text);
    }

    bridge.on_disconnect(&site, &peer_id);
    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").decrement(1.0);
    histogram!("ws_connection_duration_seconds").record(started.elapsed().as_secs_f64());
    outbound.abort();
    info!(
        peer_id = %peer_id,
        age_secs = connection.age().as_secs(),
        dropped = connection.drop_count(),
        "designer session ended"
    );
}

#[cfg(test)]
mod tests {
    // Socket behaviour is covered end to end in tests/; these check the knobs.
    use super::*;

    #[test]
    fn derives_from_server_config() {
        let server = ServerConfig {
            heartbeat_interval: Duration::from_secs(5),
            heartbeat_timeout: Duration::from_secs(15),
            send_buffer: 8,
            ..ServerConfig::default()
        };
        let session = SessionConfig::from_server(&server);
        assert_eq!(session.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(session.heartbeat_timeout, Duration::from_secs(15));
        assert_eq!(session.send_buffer, 8);
    }

    #[test]
    fn zero_buffer_is_clamped() {
        let server = ServerConfig {
            send_buffer: 0,
            ..ServerConfig::default()
        };
        assert_eq!(SessionConfig::from_server(&server).send_buffer, 1);
    }

    #[test]
    fn zero_heartbeat_is_clamped() {
        let server = ServerConfig {
            heartbeat_interval: Duration::ZERO,
            heartbeat_timeout: Duration::ZERO,
            ..ServerConfig::default()
        };
        let session = SessionConfig::from_server(&server);
        assert_eq!(session.heartbeat_interval, Duration::from_secs(1));
        assert_eq!(session.heartbeat_timeout, Duration::from_secs(1));
    }

    #[test]
    fn timeout_never_undercuts_interval() {
        let server = ServerConfig {
            heartbeat_interval: Duration::from_secs(10),
            heartbeat_timeout: Duration::from_secs(2),
            ..ServerConfig::default()
        };
        let session = SessionConfig::from_server(&server);
        assert_eq!(session.heartbeat_interval, Duration::from_secs(10));
        assert_eq!(session.heartbeat_timeout, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn clamped_interval_drives_a_ticker() {
        let session = SessionConfig::from_server(&ServerConfig {
            heartbeat_interval: Duration::ZERO,
            ..ServerConfig::default()
        });
        let mut ticker = tokio::time::interval(session.heartbeat_interval);
        let started = tokio::time::Instant::now();
        let _ = ticker.tick().await;
        let _ = ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }
}
