//! Fake peers for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::mpsc;
use webflow_core::PeerId;

use crate::peer::Peer;

/// A peer that records every frame it is sent.
pub(crate) struct FakePeer {
    id: PeerId,
    tx: mpsc::UnboundedSender<Arc<String>>,
    broken: AtomicBool,
}

impl FakePeer {
    pub(crate) fn new(id: &str) -> (Arc<Self>, mpsc::UnboundedReceiver<Arc<String>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let peer = Arc::new(Self {
            id: PeerId::from(id),
            tx,
            broken: AtomicBool::new(false),
        });
        (peer, rx)
    }

    /// Make every later `send` fail.
    pub(crate) fn break_socket(&self) {
        self.broken.store(true, Ordering::Relaxed);
    }
}

impl Peer for FakePeer {
    fn id(&self) -> &PeerId {
        &self.id
    }

    fn send(&self, frame: Arc<String>) -> bool {
        if self.broken.load(Ordering::Relaxed) {
            return false;
        }
        self.tx.send(frame).is_ok()
    }
}

/// Receive the next frame and return it parsed.
pub(crate) async fn next_frame(rx: &mut mpsc::UnboundedReceiver<Arc<String>>) -> Value {
    let text = rx.recv().await.expect("peer channel closed");
    serde_json::from_str(&text).expect("frame is JSON")
}

/// Build a `tool-call-response` frame.
pub(crate) fn response_frame(request_id: &str, data: &Value) -> String {
    serde_json::json!({
        "type": "tool-call-response",
        "data": { "requestId": request_id, "data": data },
    })
    .to_string()
}
