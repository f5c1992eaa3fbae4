//! Bootstrap tool for the local bridge.

use async_trait::async_trait;
use serde_json::{Value, json};
use webflow_core::constants::LOCAL_CONNECTION_TOOL;

use crate::errors::ToolError;
use crate::traits::WebflowTool;
use crate::types::{ToolDefinition, ToolOutput, object_schema};

/// Hands the user the URL to paste into the Designer's bridge app.
///
/// Answers immediately and never talks to a Designer, so it works before
/// any site is connected.
pub struct LocalConnectionTool {
    url: String,
}

impl LocalConnectionTool {
    /// Create the tool for a bridge reachable at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl WebflowTool for LocalConnectionTool {
    fn name(&self) -> &str {
        LOCAL_CONNECTION_TOOL
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: LOCAL_CONNECTION_TOOL.to_owned(),
            description: "Get the connection URL for the local Webflow Designer bridge. \
                Call this before any Designer tool if the Designer app is not connected yet."
                .to_owned(),
            input_schema: object_schema(json!({}), &[]),
        }
    }

    async fn execute(&self, _args: Value) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(format!(
            "Open the MCP Bridge app in the Webflow Designer and connect it to: {}",
            self.url
        )))
    }
}
