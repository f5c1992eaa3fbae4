//! `data_sites_tool`: list and inspect sites through the Webflow Data API.
//!
//! This is the tool the no-connection guidance points at, so the agent can
//! check which site id it should be using.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use webflow_core::constants::SITES_TOOL;

use crate::errors::ToolError;
use crate::traits::WebflowTool;
use crate::types::{ToolDefinition, ToolOutput, object_schema};

/// Minimal Data API client: bearer-authenticated JSON GETs, no retries.
pub struct DataApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl DataApiClient {
    /// Create a client for `base_url` (e.g. `https://api.webflow.com`).
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ToolError> {
        let base_url = Url::parse(base_url).map_err(|e| ToolError::NotConfigured {
            message: format!("invalid Data API base URL {base_url:?}: {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ToolError::NotConfigured {
                message: format!("Data API base URL {base_url} cannot carry a path"),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("webflow-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// The URL for `segments` under the base URL, each one percent-encoded.
    pub fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            let _ = path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET the path built from `segments` and decode the JSON body.
    #[instrument(skip(self))]
    pub async fn get_json(&self, segments: &[&str]) -> Result<Value, ToolError> {
        let token = self.token.as_deref().ok_or_else(|| ToolError::NotConfigured {
            message: "WEBFLOW_TOKEN is not set".into(),
        })?;
        let url = self.url_for(segments);
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                status: status.as_u16(),
                body,
            });
        }
        debug!(status = status.as_u16(), "data api response");
        Ok(response.json().await?)
    }
}

/// `list_sites` / `get_site`.
pub struct SitesTool {
    client: DataApiClient,
}

impl SitesTool {
    /// Create the tool over `client`.
    pub fn new(client: DataApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebflowTool for SitesTool {
    fn name(&self) -> &str {
        SITES_TOOL
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: SITES_TOOL.to_owned(),
            description: "Data API: list the sites this token can access, or get one site by id."
                .to_owned(),
            input_schema: object_schema(
                json!({
                    "action": {
                        "type": "string",
                        "enum": ["list_sites", "get_site"],
                    },
                    "site_id": {
                        "type": "string",
                        "description": "Required for get_site.",
                    },
                }),
                &["action"],
            ),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let action = args
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::validation("missing action"))?;

        let body = match action {
            "list_sites" => self.client.get_json(&["v2", "sites"]).await?,
            "get_site" => {
                let site_id = args
                    .get("site_id")
                    .or_else(|| args.get("siteId"))
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| ToolError::validation("get_site requires site_id"))?;
                self.client.get_json(&["v2", "sites", site_id]).await?
            }
            other => {
                return Err(ToolError::UnknownAction {
                    action: other.to_owned(),
                });
            }
        };
        Ok(ToolOutput::json(&body, false))
    }
}
