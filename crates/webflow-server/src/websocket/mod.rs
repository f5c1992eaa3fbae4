//! Designer WebSocket plumbing shared by both hosting variants.

pub mod connection;
pub mod session;
