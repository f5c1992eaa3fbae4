//! Prometheus recorder and metric names.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::errors::ServerError;

/// Install the global Prometheus recorder.
///
/// Call once at startup, before anything is recorded. The returned handle
/// renders `/metrics`.
pub fn install_recorder() -> Result<PrometheusHandle, ServerError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

// Names recorded across the bridge and server crates.

/// Designer calls finished (counter, labels: outcome).
pub const DESIGNER_CALLS_TOTAL: &str = "designer_calls_total";
/// Designer calls that hit the response bound (counter).
pub const DESIGNER_CALL_TIMEOUTS_TOTAL: &str = "designer_call_timeouts_total";
/// Designer calls with no socket to send to (counter).
pub const DESIGNER_CALLS_NO_PEER_TOTAL: &str = "designer_calls_no_peer_total";
/// Designer call latency (histogram).
pub const DESIGNER_CALL_DURATION_SECONDS: &str = "designer_call_duration_seconds";
/// Inbound or outbound frames dropped (counter, labels: reason).
pub const DESIGNER_FRAMES_DROPPED_TOTAL: &str = "designer_frames_dropped_total";
/// WebSocket connections opened (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Live WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// WebSocket connection lifetime (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Upgrades refused by token verification (counter, labels: reason).
pub const WS_AUTH_REJECTIONS_TOTAL: &str = "ws_auth_rejections_total";
/// Site actors created (counter).
pub const SITE_ACTORS_CREATED_TOTAL: &str = "site_actors_created_total";
/// Site actors evicted after their last lease dropped (counter).
pub const SITE_ACTORS_EVICTED_TOTAL: &str = "site_actors_evicted_total";
