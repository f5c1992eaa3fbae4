//! One live Designer socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use metrics::counter;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use webflow_bridge::Peer;
use webflow_core::{PeerId, SiteId};

/// A connected Designer socket, as handed to the bridge.
///
/// Outbound frames go through a bounded channel to the socket's writer task,
/// so [`Peer::send`] never waits on the network.
pub struct DesignerConnection {
    id: PeerId,
    site: SiteId,
    tx: mpsc::Sender<Arc<String>>,
    connected_at: Instant,
    is_alive: AtomicBool,
    last_seen: Mutex<Instant>,
    dropped_frames: AtomicU64,
}

impl DesignerConnection {
    /// Wrap the sending half of a socket's outbound queue.
    pub fn new(id: PeerId, site: SiteId, tx: mpsc::Sender<Arc<String>>) -> Self {
        let now = Instant::now();
        Self {
            id,
            site,
            tx,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_seen: Mutex::new(now),
            dropped_frames: AtomicU64::new(0),
        }
    }

    /// Site this socket was registered under.
    pub fn site(&self) -> &SiteId {
        &self.site
    }

    /// Frames that could not be queued.
    pub fn drop_count(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    /// Record inbound activity (any frame, including Pong).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_seen.lock() = Instant::now();
    }

    /// Time since the last inbound activity.
    pub fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }

    /// Read and clear the alive flag. `true` if anything arrived since the
    /// previous check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl Peer for DesignerConnection {
    fn id(&self) -> &PeerId {
        &self.id
    }

    fn send(&self, frame: Arc<String>) -> bool {
        if self.tx.try_send(frame).is_ok() {
            true
        } else {
            let _ = self.dropped_frames.fetch_add(1, Ordering::Relaxed);
            counter!("designer_frames_dropped_total", "reason" => "send_queue").increment(1);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(capacity: usize) -> (DesignerConnection, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            DesignerConnection::new(PeerId::from("p1"), SiteId::from("S"), tx),
            rx,
        )
    }

    #[tokio::test]
    async fn send_reaches_writer() {
        let (conn, mut rx) = connection(4);
        assert!(conn.send(Arc::new("hello".into())));
        assert_eq!(&*rx.recv().await.unwrap(), "hello");
        assert_eq!(conn.drop_count(), 0);
    }

    #[test]
    fn closed_writer_fails_send() {
        let (conn, rx) = connection(4);
        drop(rx);
        assert!(!conn.send(Arc::new("x".into())));
        assert_eq!(conn.drop_count(), 1);
    }

    #[test]
    fn full_queue_fails_send() {
        let (conn, _rx) = connection(1);
        assert!(conn.send(Arc::new("1".into())));
        assert!(!conn.send(Arc::new("2".into())));
        assert_eq!(conn.drop_count(), 1);
    }

    #[test]
    fn alive_flag_resets_on_check() {
        let (conn, _rx) = connection(1);
        assert!(conn.check_alive());
        assert!(!conn.check_alive());
        conn.mark_alive();
        assert!(conn.check_alive());
    }

    #[test]
    fn identity_is_exposed() {
        let (conn, _rx) = connection(1);
        assert_eq!(conn.id().as_str(), "p1");
        assert_eq!(conn.site().as_str(), "S");
        assert!(conn.idle_for() < Duration::from_secs(5));
        assert!(conn.age() < Duration::from_secs(5));
    }
}
