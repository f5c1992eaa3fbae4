//! Demultiplexes inbound Designer frames onto pending calls.

use std::sync::Arc;

use metrics::counter;
use tracing::debug;
use webflow_core::RequestId;
use webflow_core::frames::{PeerFrame, parse_peer_frame};

use crate::pending::PendingCalls;

/// What happened to one inbound frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A waiting call was resolved with the frame's payload.
    Resolved {
        /// The call that was resolved.
        request_id: RequestId,
    },
    /// A response for a call that already resolved, timed out, or never existed.
    Stale {
        /// The id the frame carried.
        request_id: RequestId,
    },
    /// A well-formed frame of a type the bridge does not act on.
    Ignored {
        /// The frame's `type`.
        frame_type: String,
    },
    /// Not JSON, or not shaped like any known frame.
    Malformed,
}

/// Routes `tool-call-response` frames to the pending table.
///
/// Nothing here is ever surfaced to a caller. Bad or late frames are logged
/// at `debug` and dropped.
#[derive(Clone)]
pub struct InboundRouter {
    pending: Arc<PendingCalls>,
}

impl InboundRouter {
    /// Create a router over `pending`.
    pub fn new(pending: Arc<PendingCalls>) -> Self {
        Self { pending }
    }

    /// Handle one inbound text frame.
    pub fn route(&self, text: &str) -> RouteOutcome {
        let frame = match parse_peer_frame(text) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(error = %e, "dropping malformed designer frame");
                counter!("designer_frames_dropped_total", "reason" => "malformed").increment(1);
                return RouteOutcome::Malformed;
            }
        };

        match frame {
            PeerFrame::ToolCallResponse(response) => {
                let request_id = response.request_id;
                match self.pending.take(&request_id) {
                    Some(tx) => {
                        // The receiver is gone only if the caller was dropped.
                        let _ = tx.send(response.data);
                        debug!(request_id = %request_id, "designer response delivered");
                        RouteOutcome::Resolved { request_id }
                    }
                    None => {
                        debug!(request_id = %request_id, "dropping stale designer response");
                        counter!("designer_frames_dropped_total", "reason" => "stale").increment(1);
                        RouteOutcome::Stale { request_id }
                    }
                }
            }
            PeerFrame::Other(frame_type) => {
                debug!(frame_type = %frame_type, "ignoring designer frame");
                RouteOutcome::Ignored { frame_type }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::response_frame;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn router() -> (InboundRouter, Arc<PendingCalls>) {
        let pending = Arc::new(PendingCalls::new());
        (InboundRouter::new(pending.clone()), pending)
    }

    #[tokio::test]
    async fn resolves_matching_call() {
        let (router, pending) = router();
        let rx = pending.insert(RequestId::from("S-1")).unwrap();
        let out = router.route(&response_frame("S-1", &json!({"ok": true})));
        assert_eq!(out, RouteOutcome::Resolved { request_id: RequestId::from("S-1") });
        assert_eq!(rx.await.unwrap(), json!({"ok": true}));
        assert!(pending.is_empty());
    }

    #[test]
    fn unknown_id_is_stale() {
        let (router, pending) = router();
        let _rx = pending.insert(RequestId::from("S-1")).unwrap();
        let out = router.route(&response_frame("S-2", &json!(1)));
        assert_matches!(out, RouteOutcome::Stale { request_id } if request_id.as_str() == "S-2");
        assert!(pending.contains(&RequestId::from("S-1")));
    }

    #[test]
    fn duplicate_response_is_stale() {
        let (router, pending) = router();
        let _rx = pending.insert(RequestId::from("S-1")).unwrap();
        assert_matches!(router.route(&response_frame("S-1", &json!(1))), RouteOutcome::Resolved { .. });
        assert_matches!(router.route(&response_frame("S-1", &json!(2))), RouteOutcome::Stale { .. });
    }

    #[test]
    fn garbage_is_malformed() {
        let (router, pending) = router();
        let _rx = pending.insert(RequestId::from("S-1")).unwrap();
        assert_eq!(router.route("{{{"), RouteOutcome::Malformed);
        assert_eq!(router.route(""), RouteOutcome::Malformed);
        assert_eq!(router.route(r#"{"type":"tool-call-response"}"#), RouteOutcome::Malformed);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn other_frames_are_ignored() {
        let (router, _) = router();
        assert_eq!(
            router.route(r#"{"type":"connection-confirmation","data":{}}"#),
            RouteOutcome::Ignored { frame_type: "connection-confirmation".into() }
        );
    }

    #[test]
    fn resolving_after_caller_left_does_not_panic() {
        let (router, pending) = router();
        drop(pending.insert(RequestId::from("S-1")).unwrap());
        assert_matches!(router.route(&response_frame("S-1", &json!(1))), RouteOutcome::Resolved { .. });
    }
}
