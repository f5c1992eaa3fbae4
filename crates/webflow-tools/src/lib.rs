//! # webflow-tools
//!
//! The tools the MCP server lists to the agent.
//!
//! - `designer`: Designer tools, forwarded through a `DesignerTransport`
//! - `local`: `local_de_mcp_connection_tool`, the local bootstrap helper
//! - `sites`: `data_sites_tool` over the Webflow Data API
//! - `registry`: name → tool lookup

#![deny(unsafe_code)]

pub mod designer;
pub mod errors;
pub mod local;
pub mod registry;
pub mod sites;
pub mod traits;
pub mod types;

pub use designer::{DESIGNER_TOOLS, DesignerForwardTool};
pub use errors::ToolError;
pub use local::LocalConnectionTool;
pub use registry::ToolRegistry;
pub use sites::{DataApiClient, SitesTool};
pub use traits::WebflowTool;
pub use types::{ToolContent, ToolDefinition, ToolOutput};
