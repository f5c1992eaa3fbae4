//! # webflow-bridge
//!
//! Synchronous-looking RPC against an intermittently connected Designer.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `peer` | The `Peer` capability a transport hands to the bridge |
//! | `registry` | Site id → live Designer sockets |
//! | `pending` | Request id → the waiting caller (single-winner `take`) |
//! | `engine` | `call_tool`: validate, fan out, race the timeout |
//! | `router` | Demultiplex inbound frames onto pending calls |
//! | `bridge` | One site-scope of all of the above, driven by a transport |
//! | `transport` | `DesignerTransport`, the seam the tool layer calls through |
//!
//! ## Data Flow
//!
//! tool → `engine::call_tool` → `registry::peers_for` → fan-out →
//! (socket frame) → `router::route` → `pending::take` → caller resumes.

#![deny(unsafe_code)]

pub mod bridge;
pub mod engine;
pub mod peer;
pub mod pending;
pub mod registry;
pub mod router;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use bridge::Bridge;
pub use engine::RpcEngine;
pub use peer::Peer;
pub use pending::PendingCalls;
pub use registry::ConnectionRegistry;
pub use router::{InboundRouter, RouteOutcome};
pub use transport::DesignerTransport;
