//! # webflow-core
//!
//! Shared vocabulary for the Webflow MCP crates.
//!
//! - **Branded IDs**: `SiteId`, `RequestId`, `PeerId` as newtypes for type safety
//! - **Wire frames**: the JSON envelopes exchanged with the Designer extension
//! - **Call outcomes**: `CallOutcome`, the never-failing result of a Designer call
//! - **Constants**: the tool-call timeout and user-facing guidance texts
//! - **Logging**: `tracing` subscriber bootstrap

#![deny(unsafe_code)]

pub mod constants;
pub mod frames;
pub mod ids;
pub mod logging;
pub mod outcome;

pub use ids::{PeerId, RequestId, SiteId};
pub use outcome::CallOutcome;
