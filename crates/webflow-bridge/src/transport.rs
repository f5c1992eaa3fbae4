//! The seam the tool layer calls Designer tools through.

use async_trait::async_trait;
use serde_json::Value;
use webflow_core::CallOutcome;

use crate::bridge::Bridge;

/// Something that can run a tool in a connected Designer.
///
/// The local host answers directly from its in-process [`Bridge`]; the
/// multi-tenant host forwards to the owning site actor first. Callers can't
/// tell the difference.
#[async_trait]
pub trait DesignerTransport: Send + Sync {
    /// Run `tool_name` for `site_id` and wait for the outcome.
    async fn call_tool(&self, site_id: Option<&str>, tool_name: &str, args: Value) -> CallOutcome;
}

#[async_trait]
impl DesignerTransport for Bridge {
    async fn call_tool(&self, site_id: Option<&str>, tool_name: &str, args: Value) -> CallOutcome {
        Bridge::call_tool(self, site_id, tool_name, args).await
    }
}
