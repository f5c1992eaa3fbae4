//! What the bridge needs from a Designer socket.

use std::sync::Arc;

use webflow_core::PeerId;

/// A live Designer socket as seen by the bridge.
///
/// `send` must not block or yield: it enqueues the frame for the socket's
/// writer task and reports whether that worked. A `false` return is how a
/// half-closed or saturated socket fails during fan-out without affecting
/// the other sockets of the same site.
pub trait Peer: Send + Sync {
    /// Stable id of this socket.
    fn id(&self) -> &PeerId;

    /// Enqueue a text frame. Returns `false` if it could not be queued.
    fn send(&self, frame: Arc<String>) -> bool;
}
