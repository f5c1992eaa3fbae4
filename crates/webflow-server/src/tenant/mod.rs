//! Multi-tenant hosting: one actor per site.
//!
//! A call from the tool layer takes two hops: locate (or create) the site's
//! actor by name, then POST `{toolName, args}` to the actor's internal
//! router, which runs the call on the actor's private bridge. The actor's
//! sockets and pending calls are never visible to any other site. Actors
//! with no open socket and no call in flight are evicted.

pub mod actor;
pub mod directory;
pub mod gateway;
pub mod transport;

pub use actor::{CALL_TOOL_PATH, CallToolRequest, SiteActor};
pub use directory::{ActorDirectory, ActorLease};
pub use transport::TenantTransport;
