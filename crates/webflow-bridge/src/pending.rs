//! Request id → the caller waiting on it.
//!
//! [`PendingCalls::take`] is the only way an entry leaves the table, and it
//! is atomic. The timeout path and the response path both call it; exactly
//! one of them gets the sender and the other gets `None` and does nothing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use webflow_core::RequestId;

/// In-flight Designer calls.
pub struct PendingCalls {
    calls: Mutex<HashMap<RequestId, oneshot::Sender<Value>>>,
}

impl PendingCalls {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Register a waiting caller for `request_id`.
    ///
    /// Returns `None`, leaving the existing entry untouched, if the id is
    /// already pending.
    pub fn insert(&self, request_id: RequestId) -> Option<oneshot::Receiver<Value>> {
        match self.calls.lock().entry(request_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let (tx, rx) = oneshot::channel();
                let _ = slot.insert(tx);
                Some(rx)
            }
        }
    }

    /// Remove and return the entry for `request_id`, if still present.
    pub fn take(&self, request_id: &RequestId) -> Option<oneshot::Sender<Value>> {
        self.calls.lock().remove(request_id)
    }

    /// Whether `request_id` is still waiting.
    pub fn contains(&self, request_id: &RequestId) -> bool {
        self.calls.lock().contains_key(request_id)
    }

    /// Number of calls in flight.
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Whether no call is in flight.
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self::new()
    }
}
