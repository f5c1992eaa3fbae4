//! Site id → live Designer sockets.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;
use webflow_core::{PeerId, SiteId};

use crate::peer::Peer;

/// Which sockets are currently connected for which site.
///
/// Process-lifetime state only: a restart drops every registration and the
/// Designer clients have to reconnect. A socket is registered under the site
/// it presented at connect time and never moves to another site.
pub struct ConnectionRegistry {
    sites: RwLock<HashMap<SiteId, HashMap<PeerId, Arc<dyn Peer>>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sites: RwLock::new(HashMap::new()),
        }
    }

    /// Add `peer` to the set for `site`, creating the set if needed.
    ///
    /// Registering the same peer twice leaves one entry.
    pub fn register(&self, site: &SiteId, peer: Arc<dyn Peer>) {
        let mut sites = self.sites.write();
        let peers = sites.entry(site.clone()).or_default();
        let _ = peers.insert(peer.id().clone(), peer);
        debug!(site_id = %site, peers = peers.len(), "designer socket registered");
    }

    /// Remove the peer from the set for `site`. No-op if either is unknown.
    ///
    /// An emptied set is kept; looking it up later simply yields no peers.
    pub fn unregister(&self, site: &SiteId, peer_id: &PeerId) {
        let mut sites = self.sites.write();
        if let Some(peers) = sites.get_mut(site) {
            if peers.remove(peer_id).is_some() {
                debug!(site_id = %site, peer_id = %peer_id, peers = peers.len(), "designer socket unregistered");
            }
        }
    }

    /// Snapshot of the sockets currently registered for `site`.
    pub fn peers_for(&self, site: &SiteId) -> Vec<Arc<dyn Peer>> {
        self.sites
            .read()
            .get(site)
            .map(|peers| peers.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `site` has at least one socket.
    pub fn is_connected(&self, site: &SiteId) -> bool {
        self.sites.read().get(site).is_some_and(|p| !p.is_empty())
    }

    /// Number of sites with at least one socket.
    pub fn site_count(&self) -> usize {
        self.sites.read().values().filter(|p| !p.is_empty()).count()
    }

    /// Total number of registered sockets.
    pub fn connection_count(&self) -> usize {
        self.sites.read().values().map(HashMap::len).sum()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
