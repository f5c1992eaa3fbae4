//! Locate-or-create for site actors.

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use metrics::counter;
use tokio_util::sync::CancellationToken;
use tracing::info;
use webflow_core::SiteId;
use webflow_core::constants::TOOL_CALL_TIMEOUT;

use super::actor::SiteActor;
use crate::health::BridgeStats;
use crate::websocket::session::SessionConfig;

type ActorMap = DashMap<String, Arc<SiteActor>>;

/// Every live site actor, keyed by actor name.
///
/// At most one actor exists per name: creation goes through the map's entry
/// API, so two concurrent lookups for a new site share one instance. An
/// actor stays in the map while at least one [`ActorLease`] on it is alive.
pub struct ActorDirectory {
    actors: Arc<ActorMap>,
    session: SessionConfig,
    call_timeout: Duration,
    shutdown: CancellationToken,
}

impl ActorDirectory {
    /// Create an empty directory. New actors inherit `session` and `shutdown`.
    pub fn new(session: SessionConfig, shutdown: CancellationToken) -> Self {
        Self {
            actors: Arc::new(DashMap::new()),
            session,
            call_timeout: TOOL_CALL_TIMEOUT,
            shutdown,
        }
    }

    /// Override the response bound for actors created from now on.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// A lease on the actor for `site`, created on first use.
    ///
    /// The lease is taken under the map's shard lock, so eviction can never
    /// remove an actor between lookup and lease.
    pub fn locate_or_create(&self, site: &SiteId) -> ActorLease {
        let entry = self.actors.entry(site.actor_name()).or_insert_with(|| {
            counter!("site_actors_created_total").increment(1);
            info!(site_id = %site, "site actor created");
            Arc::new(SiteActor::new(
                site.clone(),
                self.session,
                self.call_timeout,
                self.shutdown.clone(),
            ))
        });
        entry.retain();
        ActorLease {
            actor: entry.value().clone(),
            actors: self.actors.clone(),
        }
    }

    /// The actor for `site`, if one exists. Does not lease it.
    pub fn get(&self, site: &SiteId) -> Option<Arc<SiteActor>> {
        self.actors.get(&site.actor_name()).map(|a| a.value().clone())
    }

    /// Number of actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether no actor exists.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Totals across every actor.
    pub fn stats(&self) -> BridgeStats {
        self.actors.iter().fold(BridgeStats::default(), |mut acc, entry| {
            let bridge = entry.value().bridge();
            acc.connections += bridge.registry().connection_count();
            acc.sites += bridge.registry().site_count();
            acc.pending_calls += bridge.pending().len();
            acc
        })
    }
}

/// Keeps a site actor in its directory.
///
/// Designer sessions hold one for the life of the socket and internal calls
/// hold one until the outcome is back. Dropping the last lease evicts the
/// actor.
pub struct ActorLease {
    actor: Arc<SiteActor>,
    actors: Arc<ActorMap>,
}

impl ActorLease {
    /// The leased actor.
    pub fn actor(&self) -> &Arc<SiteActor> {
        &self.actor
    }
}

impl Deref for ActorLease {
    type Target = SiteActor;

    fn deref(&self) -> &SiteActor {
        &self.actor
    }
}

impl Drop for ActorLease {
    fn drop(&mut self) {
        if self.actor.release() > 0 {
            return;
        }
        let evicted = self.actors.remove_if(self.actor.name(), |_, current| {
            Arc::ptr_eq(current, &self.actor) && current.leases() == 0
        });
        if evicted.is_some() {
            counter!("site_actors_evicted_total").increment(1);
            info!(site_id = %self.actor.site(), "site actor evicted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> ActorDirectory {
        ActorDirectory::new(SessionConfig::default(), CancellationToken::new())
    }

    #[test]
    fn same_site_same_actor() {
        let dir = directory();
        let a = dir.locate_or_create(&SiteId::from("s1"));
        let b = dir.locate_or_create(&SiteId::from("s1"));
        assert!(Arc::ptr_eq(a.actor(), b.actor()));
        assert_eq!(a.leases(), 2);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn different_sites_different_actors() {
        let dir = directory();
        let a = dir.locate_or_create(&SiteId::from("s1"));
        let b = dir.locate_or_create(&SiteId::from("s2"));
        assert!(!Arc::ptr_eq(a.actor(), b.actor()));
        assert!(!Arc::ptr_eq(a.bridge(), b.bridge()));
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn get_does_not_create() {
        let dir = directory();
        assert!(dir.get(&SiteId::from("s1")).is_none());
        assert!(dir.is_empty());
        let _lease = dir.locate_or_create(&SiteId::from("s1"));
        assert!(dir.get(&SiteId::from("s1")).is_some());
    }

    #[test]
    fn last_lease_evicts_actor() {
        let dir = directory();
        let site = SiteId::from("s1");
        let a = dir.locate_or_create(&site);
        let b = dir.locate_or_create(&site);
        drop(a);
        assert_eq!(dir.len(), 1);
        drop(b);
        assert!(dir.is_empty());
        assert!(dir.get(&site).is_none());
    }

    #[test]
    fn relocating_after_eviction_builds_fresh_actor() {
        let dir = directory();
        let site = SiteId::from("s1");
        let first = dir.locate_or_create(&site).actor().clone();
        assert!(dir.is_empty());
        let second = dir.locate_or_create(&site);
        assert!(!Arc::ptr_eq(&first, second.actor()));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn stale_lease_does_not_evict_successor() {
        let dir = directory();
        let site = SiteId::from("s1");
        let old = dir.locate_or_create(&site);
        let stale = old.actor().clone();
        drop(old);
        let current = dir.locate_or_create(&site);

        // The old instance is gone; releasing through it again must not
        // touch the new entry.
        stale.retain();
        drop(ActorLease {
            actor: stale,
            actors: dir.actors.clone(),
        });
        assert_eq!(dir.len(), 1);
        assert_eq!(current.leases(), 1);
    }

    #[test]
    fn fresh_actor_uses_default_timeout() {
        let dir = directory();
        let lease = dir.locate_or_create(&SiteId::from("s1"));
        assert_eq!(lease.bridge().timeout(), TOOL_CALL_TIMEOUT);
        assert_eq!(lease.bridge().timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn call_timeout_override_reaches_new_actors() {
        let dir = directory().with_call_timeout(Duration::from_millis(200));
        let lease = dir.locate_or_create(&SiteId::from("s1"));
        assert_eq!(lease.bridge().timeout(), Duration::from_millis(200));
    }

    #[test]
    fn concurrent_creation_yields_one_actor() {
        let dir = Arc::new(directory());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dir = dir.clone();
                std::thread::spawn(move || dir.locate_or_create(&SiteId::from("hot")))
            })
            .collect();
        let leases: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(leases.windows(2).all(|w| Arc::ptr_eq(w[0].actor(), w[1].actor())));
        assert_eq!(leases[0].leases(), 8);
        assert_eq!(dir.len(), 1);
        drop(leases);
        assert!(dir.is_empty());
    }

    #[test]
    fn concurrent_churn_leaves_directory_empty() {
        let dir = Arc::new(directory());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dir = dir.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let lease = dir.locate_or_create(&SiteId::from("hot"));
                        assert!(dir.get(&SiteId::from("hot")).is_some());
                        drop(lease);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(dir.is_empty());
    }

    #[test]
    fn empty_stats() {
        let dir = directory();
        let _lease = dir.locate_or_create(&SiteId::from("s1"));
        assert_eq!(dir.stats(), BridgeStats::default());
    }
}
