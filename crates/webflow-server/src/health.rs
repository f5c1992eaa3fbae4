//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is running.
    pub status: &'static str,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Live Designer sockets.
    pub connections: usize,
    /// Sites with at least one live socket.
    pub sites: usize,
    /// Designer calls waiting for a response.
    pub pending_calls: usize,
}

/// Live counters feeding [`HealthResponse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Live Designer sockets.
    pub connections: usize,
    /// Sites with at least one live socket.
    pub sites: usize,
    /// Designer calls waiting for a response.
    pub pending_calls: usize,
}

/// Build a health response.
pub fn health_check(start_time: Instant, stats: BridgeStats) -> HealthResponse {
    HealthResponse {
        status: "ok",
        uptime_secs: start_time.elapsed().as_secs(),
        connections: stats.connections,
        sites: stats.sites,
        pending_calls: stats.pending_calls,
    }
}
