//! MCP protocol errors and their JSON-RPC codes.

use crate::types::JsonRpcError;

/// Invalid JSON.
pub const PARSE_ERROR: i32 = -32700;
/// Not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;
/// Method does not exist.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i32 = -32602;
/// Internal error.
pub const INTERNAL_ERROR: i32 = -32603;

/// Errors that become JSON-RPC error responses.
///
/// Tool failures are not in here: they are reported inside a successful
/// `tools/call` result with `isError: true`.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// The line was not JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON, but not a request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown method.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Bad or missing parameters, including unknown tool names.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// JSON-RPC error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse(_) => PARSE_ERROR,
            Self::InvalidRequest(_) => INVALID_REQUEST,
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::InvalidParams(_) => INVALID_PARAMS,
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }
}

impl From<McpError> for JsonRpcError {
    fn from(err: McpError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            data: None,
        }
    }
}
