//! Tools that run inside the Webflow Designer.
//!
//! Each one is a thin forwarder: pull `siteId` out of the arguments and hand
//! `(siteId, name, args)` to the [`DesignerTransport`]. The Designer app
//! interprets the arguments; nothing is validated here beyond the site id,
//! which the transport checks.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;
use webflow_bridge::DesignerTransport;
use webflow_core::CallOutcome;

use crate::errors::ToolError;
use crate::traits::WebflowTool;
use crate::types::{ToolDefinition, ToolOutput, object_schema};

/// Designer tool names and descriptions.
pub const DESIGNER_TOOLS: &[(&str, &str)] = &[
    (
        "element_tool",
        "Designer: inspect and modify elements on the current page (select, get, update attributes, text, links).",
    ),
    (
        "element_builder",
        "Designer: create new elements on the current page, nested under a parent element.",
    ),
    (
        "element_snapshot_tool",
        "Designer: capture a visual snapshot of an element on the current page.",
    ),
    (
        "style_tool",
        "Designer: list, create and update styles and their properties, per breakpoint and pseudo state.",
    ),
    (
        "variable_tool",
        "Designer: manage variable collections, modes and variables (color, size, number, font family).",
    ),
    (
        "de_page_tool",
        "Designer: list, create and switch pages and folders.",
    ),
    (
        "de_component_tool",
        "Designer: list components, insert component instances, and enter or leave component editing.",
    ),
    (
        "asset_tool",
        "Designer: list, upload and organise assets and asset folders.",
    ),
    (
        "whtml_builder",
        "Designer: build elements on the current page from an HTML and CSS snippet.",
    ),
];

/// One Designer tool, forwarded through a transport.
pub struct DesignerForwardTool {
    name: &'static str,
    description: &'static str,
    transport: Arc<dyn DesignerTransport>,
}

impl DesignerForwardTool {
    /// Create the forwarder for `name`.
    pub fn new(
        name: &'static str,
        description: &'static str,
        transport: Arc<dyn DesignerTransport>,
    ) -> Self {
        Self {
            name,
            description,
            transport,
        }
    }

    /// One forwarder per entry in [`DESIGNER_TOOLS`].
    pub fn catalogue(transport: &Arc<dyn DesignerTransport>) -> Vec<Arc<dyn WebflowTool>> {
        DESIGNER_TOOLS
            .iter()
            .map(|(name, description)| {
                Arc::new(Self::new(name, description, transport.clone())) as Arc<dyn WebflowTool>
            })
            .collect()
    }
}

/// Render a call outcome for the agent. Local error shapes are `isError`.
pub fn render_outcome(outcome: CallOutcome) -> ToolOutput {
    let is_error = outcome.is_error();
    ToolOutput::json(&outcome.into_value(), is_error)
}

#[async_trait]
impl WebflowTool for DesignerForwardTool {
    fn name(&self) -> &str {
        self.name
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            input_schema: object_schema(
                json!({
                    "siteId": {
                        "type": "string",
                        "description": "ID of the site open in the Designer.",
                    },
                    "actions": {
                        "type": "array",
                        "description": "Operations for the Designer app to perform, in order.",
                        "items": { "type": "object" },
                    },
                }),
                &["siteId"],
            ),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let site_id = args.get("siteId").and_then(Value::as_str).map(str::to_owned);
        let outcome = self
            .transport
            .call_tool(site_id.as_deref(), self.name, args)
            .await;
        debug!(tool_name = self.name, outcome = outcome.label(), "designer tool finished");
        Ok(render_outcome(outcome))
    }
}
