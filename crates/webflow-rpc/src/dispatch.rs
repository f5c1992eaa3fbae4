//! MCP method dispatch.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, instrument, warn};
use webflow_core::constants::{NAME, VERSION};
use webflow_tools::{ToolOutput, ToolRegistry};

use crate::errors::McpError;
use crate::types::{
    CallToolParams, InitializeResult, JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse,
    PROTOCOL_VERSION, RequestId, ServerInfo,
};

/// Answers MCP requests from a [`ToolRegistry`].
#[derive(Clone)]
pub struct McpServer {
    tools: Arc<ToolRegistry>,
}

impl McpServer {
    /// Create a server over `tools`.
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// The registry this server lists and calls.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handle one raw line. `None` means nothing should be written back.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "unparsable MCP line");
                return Some(JsonRpcResponse::error(None, McpError::Parse(e.to_string()).into()));
            }
        };

        let id = value
            .get("id")
            .and_then(|v| serde_json::from_value::<RequestId>(v.clone()).ok());

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    McpError::InvalidRequest(e.to_string()).into(),
                ));
            }
        };

        self.handle(request).await
    }

    /// Handle a parsed request. Notifications yield `None`.
    #[instrument(skip_all, fields(method = %request.method))]
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        metrics::counter!("mcp_requests_total", "method" => request.method.clone()).increment(1);

        let Some(id) = request.id else {
            debug!("notification received");
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            let err = McpError::InvalidRequest(format!("unsupported jsonrpc {}", request.jsonrpc));
            return Some(JsonRpcResponse::error(Some(id), err.into()));
        }

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                debug!(error = %err, "request failed");
                JsonRpcResponse::error(Some(id), err.into())
            }
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        match method {
            "initialize" => to_value(&InitializeResult {
                protocol_version: PROTOCOL_VERSION,
                capabilities: json!({ "tools": { "listChanged": false } }),
                server_info: ServerInfo {
                    name: NAME,
                    version: VERSION,
                },
            }),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tools.definitions() })),
            "tools/call" => self.call_tool(params).await,
            other => Err(McpError::MethodNotFound(other.to_owned())),
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let tool = self
            .tools
            .get(&params.name)
            .ok_or_else(|| McpError::InvalidParams(format!("unknown tool: {}", params.name)))?;

        let args = params.arguments.unwrap_or_else(|| json!({}));
        let output = match tool.execute(args).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool_name = %params.name, error = %e, "tool failed");
                ToolOutput::error(e.to_string())
            }
        };

        let is_error = if output.is_error { "true" } else { "false" };
        metrics::counter!("mcp_tool_calls_total", "tool" => params.name, "is_error" => is_error)
            .increment(1);

        to_value(&output)
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use webflow_bridge::{Bridge, DesignerTransport};
    use webflow_core::constants::{LOCAL_CONNECTION_TOOL, NO_CONNECTION_MESSAGE};
    use webflow_tools::{DesignerForwardTool, LocalConnectionTool, ToolDefinition, ToolError};
    use webflow_tools::traits::WebflowTool;

    use crate::errors::{INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};

    struct FailingTool;

    #[async_trait]
    impl WebflowTool for FailingTool {
        fn name(&self) -> &str {
            "failing_tool"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "failing_tool".into(),
                description: "always fails".into(),
                input_schema: json!({"type": "object"}),
            }
        }

        async fn execute(&self, _args: Value) -> Result<ToolOutput, ToolError> {
            Err(ToolError::validation("action is required"))
        }
    }

    fn server() -> McpServer {
        let transport: Arc<dyn DesignerTransport> = Arc::new(Bridge::new());
        let mut tools = ToolRegistry::new();
        tools.extend(DesignerForwardTool::catalogue(&transport));
        tools.register(Arc::new(LocalConnectionTool::new("ws://127.0.0.1:1338/ws")));
        tools.register(Arc::new(FailingTool));
        McpServer::new(Arc::new(tools))
    }

    async fn call(server: &McpServer, line: &str) -> JsonRpcResponse {
        server.handle_line(line).await.unwrap()
    }

    fn text_of(result: &Value) -> &str {
        result["content"][0]["text"].as_str().unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_identity() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#).await;
        let result = resp.result.unwrap();
        assert_eq!(resp.id, Some(RequestId::Number(1)));
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn ping_is_empty_object() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#).await;
        assert_eq!(resp.result, Some(json!({})));
        assert_eq!(resp.id, Some(RequestId::String("p".into())));
    }

    #[tokio::test]
    async fn tools_list_is_sorted() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"element_tool"));
        assert!(names.contains(&LOCAL_CONNECTION_TOOL));
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[tokio::test]
    async fn designer_tool_without_peer_is_tool_error() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"element_tool","arguments":{"siteId":"site-1","actions":[]}}}"#,
        )
        .await;
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(text_of(&result).contains(NO_CONNECTION_MESSAGE));
    }

    #[tokio::test]
    async fn designer_tool_without_site_id() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"style_tool","arguments":{}}}"#,
        )
        .await;
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(text_of(&result).contains("Site ID is required"));
    }

    #[tokio::test]
    async fn local_connection_tool_needs_no_peer() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"local_de_mcp_connection_tool"}}"#,
        )
        .await;
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], false);
        assert!(text_of(&result).contains("ws://127.0.0.1:1338/ws"));
    }

    #[tokio::test]
    async fn tool_errors_become_error_content() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"failing_tool","arguments":{}}}"#,
        )
        .await;
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(text_of(&result).contains("action is required"));
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"nope"}}"#,
        )
        .await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("nope"));
    }

    #[tokio::test]
    async fn missing_call_params_is_invalid_params() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":8,"method":"tools/call"}"#).await;
        assert_matches!(resp.error, Some(ref e) if e.code == INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_method() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":9,"method":"resources/list"}"#).await;
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn garbage_is_parse_error_with_null_id() {
        let resp = call(&server(), "{not json").await;
        assert_eq!(resp.id, None);
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn non_request_json_keeps_id() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":10}"#).await;
        assert_eq!(resp.id, Some(RequestId::Number(10)));
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn wrong_version_is_invalid_request() {
        let resp = call(&server(), r#"{"jsonrpc":"1.0","id":11,"method":"ping"}"#).await;
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }
}
