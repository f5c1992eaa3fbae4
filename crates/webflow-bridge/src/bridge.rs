//! One scope of the Designer bridge, driven by a socket host.
//!
//! The local host runs a single `Bridge` for the whole process. The
//! multi-tenant host runs one per site actor. Either way the socket layer
//! only ever talks to these four entry points.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};
use webflow_core::constants::CONNECTION_CONFIRMED_MESSAGE;
use webflow_core::frames::{ConnectionConfirmation, ServerFrame};
use webflow_core::{CallOutcome, PeerId, SiteId};

use crate::engine::RpcEngine;
use crate::peer::Peer;
use crate::pending::PendingCalls;
use crate::registry::ConnectionRegistry;
use crate::router::{InboundRouter, RouteOutcome};

/// Registry, pending table, engine and router bundled together.
pub struct Bridge {
    registry: Arc<ConnectionRegistry>,
    pending: Arc<PendingCalls>,
    engine: RpcEngine,
    router: InboundRouter,
}

impl Bridge {
    /// Create a bridge with empty state and the standard timeout.
    pub fn new() -> Self {
        Self::from_parts(
            Arc::new(ConnectionRegistry::new()),
            Arc::new(PendingCalls::new()),
        )
    }

    /// Create a bridge over existing state.
    pub fn from_parts(registry: Arc<ConnectionRegistry>, pending: Arc<PendingCalls>) -> Self {
        Self {
            engine: RpcEngine::new(registry.clone(), pending.clone()),
            router: InboundRouter::new(pending.clone()),
            registry,
            pending,
        }
    }

    /// Override the response bound.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.engine = self.engine.with_timeout(timeout);
        self
    }

    /// The response bound in effect.
    pub fn timeout(&self) -> Duration {
        self.engine.timeout()
    }

    /// The connection registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// The pending call table.
    pub fn pending(&self) -> &Arc<PendingCalls> {
        &self.pending
    }

    /// Register `peer` under `site` and greet it with a confirmation frame.
    pub fn on_connect(&self, site: &SiteId, peer: Arc<dyn Peer>) {
        let peer_id = peer.id().clone();
        self.registry.register(site, peer.clone());
        info!(site_id = %site, peer_id = %peer_id, "designer connected");

        let frame = ServerFrame::ConnectionConfirmation(ConnectionConfirmation {
            site_id: site.clone(),
            message: CONNECTION_CONFIRMED_MESSAGE.to_owned(),
        });
        match frame.encode() {
            Ok(text) => {
                if !peer.send(Arc::new(text)) {
                    warn!(peer_id = %peer_id, "failed to queue connection confirmation");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode connection confirmation"),
        }
    }

    /// Handle one inbound text frame from `peer`.
    pub fn on_message(&self, peer: &PeerId, text: &str) -> RouteOutcome {
        let outcome = self.router.route(text);
        if let RouteOutcome::Resolved { request_id } = &outcome {
            debug!(peer_id = %peer, request_id = %request_id, "response accepted");
        }
        outcome
    }

    /// Forget `peer`. In-flight calls keep waiting for their timeout.
    pub fn on_disconnect(&self, site: &SiteId, peer: &PeerId) {
        self.registry.unregister(site, peer);
        info!(site_id = %site, peer_id = %peer, "designer disconnected");
    }

    /// Send `frame` to every socket of `site`. Returns how many accepted it.
    pub fn broadcast(&self, site: &SiteId, frame: &ServerFrame) -> usize {
        let text = match frame.encode() {
            Ok(text) => Arc::new(text),
            Err(e) => {
                warn!(error = %e, "failed to encode broadcast frame");
                return 0;
            }
        };
        self.registry
            .peers_for(site)
            .iter()
            .filter(|peer| peer.send(text.clone()))
            .count()
    }

    /// Run a Designer tool for `site_id`.
    pub async fn call_tool(&self, site_id: Option<&str>, tool_name: &str, args: Value) -> CallOutcome {
        self.engine.call_tool(site_id, tool_name, args).await
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}
