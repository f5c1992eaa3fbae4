//! The trait every tool implements.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ToolError;
use crate::types::{ToolDefinition, ToolOutput};

/// A tool the agent can call.
///
/// Expected failures the agent should read (no Designer connected, Data API
/// said no) are `Ok` outputs with `is_error` set, or `Err` values that the
/// MCP layer renders the same way. Nothing here should panic on bad input.
#[async_trait]
pub trait WebflowTool: Send + Sync {
    /// Exact name the agent calls the tool by.
    fn name(&self) -> &str;

    /// Schema listed to the agent.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool.
    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError>;
}
