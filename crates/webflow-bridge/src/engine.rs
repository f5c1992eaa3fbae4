//! The Designer call engine.
//!
//! One operation, [`RpcEngine::call_tool`]. Per call the states are
//! `initiated → dispatched → {resolved | timed out}`, with no retries. The
//! registry and the pending table are injected so one engine can serve a
//! whole process (local host) or a single site (multi-tenant actor).

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use webflow_core::constants::TOOL_CALL_TIMEOUT;
use webflow_core::frames::{CallToolFrame, ServerFrame};
use webflow_core::{CallOutcome, RequestId, SiteId};

use crate::pending::PendingCalls;
use crate::registry::ConnectionRegistry;

/// Dispatches tool calls to Designer sockets and waits for the first answer.
pub struct RpcEngine {
    registry: Arc<ConnectionRegistry>,
    pending: Arc<PendingCalls>,
    timeout: Duration,
}

impl RpcEngine {
    /// Create an engine over the given registry and pending table.
    pub fn new(registry: Arc<ConnectionRegistry>, pending: Arc<PendingCalls>) -> Self {
        Self {
            registry,
            pending,
            timeout: TOOL_CALL_TIMEOUT,
        }
    }

    /// Override the response bound.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The response bound in effect.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The registry this engine dispatches through.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// The pending table this engine resolves through.
    pub fn pending(&self) -> &Arc<PendingCalls> {
        &self.pending
    }

    /// Run `tool_name` in every Designer connected for `site_id`.
    ///
    /// Resolves exactly once with the first matching response, or with one
    /// of the local error outcomes. Never fails.
    #[instrument(skip_all, fields(site_id = site_id.unwrap_or(""), tool_name = %tool_name))]
    pub async fn call_tool(&self, site_id: Option<&str>, tool_name: &str, args: Value) -> CallOutcome {
        let started = Instant::now();
        let outcome = self.dispatch(site_id, tool_name, args).await;
        counter!("designer_calls_total", "outcome" => outcome.label()).increment(1);
        match outcome {
            CallOutcome::NoConnection => counter!("designer_calls_no_peer_total").increment(1),
            CallOutcome::TimedOut => counter!("designer_call_timeouts_total").increment(1),
            _ => {}
        }
        histogram!("designer_call_duration_seconds").record(started.elapsed().as_secs_f64());
        outcome
    }

    async fn dispatch(&self, site_id: Option<&str>, tool_name: &str, args: Value) -> CallOutcome {
        let Some(site) = SiteId::parse_opt(site_id) else {
            debug!("call rejected: no site id");
            return CallOutcome::SiteIdRequired;
        };

        let peers = self.registry.peers_for(&site);
        if peers.is_empty() {
            info!(site_id = %site, "no designer connected");
            return CallOutcome::NoConnection;
        }

        let (request_id, rx) = loop {
            let id = RequestId::mint(&site);
            if let Some(rx) = self.pending.insert(id.clone()) {
                break (id, rx);
            }
        };
        let _entry = PendingEntry {
            pending: &self.pending,
            request_id: request_id.clone(),
        };

        let frame = ServerFrame::CallTool(CallToolFrame {
            tool_name: tool_name.to_owned(),
            args,
            site_id: site.clone(),
            request_id: request_id.clone(),
        });
        let text = match frame.encode() {
            Ok(text) => Arc::new(text),
            Err(e) => {
                error!(request_id = %request_id, error = %e, "failed to encode call frame");
                return CallOutcome::NoConnection;
            }
        };

        let mut delivered = 0usize;
        for peer in &peers {
            if peer.send(text.clone()) {
                delivered += 1;
            } else {
                warn!(request_id = %request_id, peer_id = %peer.id(), "send to designer failed");
            }
        }
        if delivered == 0 {
            info!(site_id = %site, request_id = %request_id, "every designer send failed");
            return CallOutcome::NoConnection;
        }
        debug!(request_id = %request_id, peers = delivered, "call dispatched");

        let sleep = tokio::time::sleep(self.timeout);
        tokio::pin!(sleep);
        let mut rx = rx;
        let first = tokio::select! {
            res = &mut rx => Some(res),
            () = &mut sleep => None,
        };
        let received = match first {
            Some(res) => res,
            None => {
                if self.pending.take(&request_id).is_some() {
                    warn!(request_id = %request_id, timeout_ms = self.timeout.as_millis(), "designer call timed out");
                    return CallOutcome::TimedOut;
                }
                // The response path took the entry first; its value is on the way.
                rx.await
            }
        };

        match received {
            Ok(value) => {
                debug!(request_id = %request_id, "designer call resolved");
                CallOutcome::Response(value)
            }
            Err(_) => CallOutcome::TimedOut,
        }
    }
}

/// Removes the call's pending entry however `dispatch` ends, including when
/// the caller drops the future mid-wait.
struct PendingEntry<'a> {
    pending: &'a PendingCalls,
    request_id: RequestId,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        if self.pending.take(&self.request_id).is_some() {
            debug!(request_id = %self.request_id, "pending call abandoned");
        }
    }
}
