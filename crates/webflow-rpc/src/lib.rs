//! # webflow-rpc
//!
//! The MCP surface: JSON-RPC 2.0 messages, method dispatch over the
//! [`ToolRegistry`](webflow_tools::ToolRegistry), and the newline-delimited
//! stdio loop the agent talks to.
//!
//! Supported methods: `initialize`, `ping`, `tools/list`, `tools/call`.
//! Notifications are accepted and never answered.

#![deny(unsafe_code)]

pub mod dispatch;
pub mod errors;
pub mod stdio;
pub mod types;

pub use dispatch::McpServer;
pub use errors::McpError;
pub use stdio::serve;
pub use types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
