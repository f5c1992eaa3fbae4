//! `DesignerTransport` over the actor directory.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, header};
use serde_json::Value;
use tracing::error;
use webflow_bridge::DesignerTransport;
use webflow_core::{CallOutcome, SiteId};

use super::actor::{CALL_TOOL_PATH, CallToolRequest};
use super::directory::ActorDirectory;

/// Upper bound on an internal response body.
const MAX_OUTCOME_BYTES: usize = 16 * 1024 * 1024;

/// Routes each call to the owning site actor over its internal POST.
#[derive(Clone)]
pub struct TenantTransport {
    directory: Arc<ActorDirectory>,
}

impl TenantTransport {
    /// Create a transport over `directory`.
    pub fn new(directory: Arc<ActorDirectory>) -> Self {
        Self { directory }
    }

    async fn forward(&self, site: &SiteId, tool_name: &str, args: Value) -> Result<CallOutcome, String> {
        // Held until the outcome is decoded.
        let actor = self.directory.locate_or_create(site);
        let body = serde_json::to_vec(&CallToolRequest {
            tool_name: tool_name.to_owned(),
            args,
        })
        .map_err(|e| format!("encode request: {e}"))?;
        let request = Request::builder()
            .method("POST")
            .uri(CALL_TOOL_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|e| format!("build request: {e}"))?;

        let response = actor.fetch(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_OUTCOME_BYTES)
            .await
            .map_err(|e| format!("read response: {e}"))?;
        if !status.is_success() {
            return Err(format!("actor returned {status}: {}", String::from_utf8_lossy(&bytes)));
        }
        serde_json::from_slice(&bytes).map_err(|e| format!("decode outcome: {e}"))
    }
}

#[async_trait]
impl DesignerTransport for TenantTransport {
    async fn call_tool(&self, site_id: Option<&str>, tool_name: &str, args: Value) -> CallOutcome {
        let Some(site) = SiteId::parse_opt(site_id) else {
            return CallOutcome::SiteIdRequired;
        };
        match self.forward(&site, tool_name, args).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(site_id = %site, tool_name, error = %e, "internal actor call failed");
                CallOutcome::NoConnection
            }
        }
    }
}
