//! # webflow-server
//!
//! Axum HTTP + `WebSocket` hosting for the Designer bridge.
//!
//! - Local variant: `GET /ws?siteId=...`, one in-process bridge
//! - Multi-tenant variant: `GET /designer/connect` with a bearer token, one
//!   actor (and bridge) per site, calls forwarded over an internal POST
//! - `/health` with bridge counters, `/metrics` in Prometheus text
//! - Heartbeat pings and graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod errors;
pub mod health;
pub mod local;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod tenant;
pub mod websocket;

pub use auth::{AuthError, JwtTokenVerifier, TokenVerifier};
pub use config::ServerConfig;
pub use errors::ServerError;
pub use server::{BridgeHost, BridgeServer};
pub use shutdown::ShutdownCoordinator;
