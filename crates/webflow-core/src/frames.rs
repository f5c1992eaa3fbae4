//! JSON frames exchanged with the Designer extension.
//!
//! Every server→peer frame is an envelope `{"type": ..., "data": ...}`.
//! The only peer→server frame the bridge acts on is `tool-call-response`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ids::{RequestId, SiteId};

/// Frame type of a call dispatched to the Designer.
pub const CALL_TOOL: &str = "call-tool";
/// Frame type of the connect acknowledgement.
pub const CONNECTION_CONFIRMATION: &str = "connection-confirmation";
/// Frame type of a server-side error notice.
pub const ERROR: &str = "error";
/// Frame type of a Designer's answer to a call.
pub const TOOL_CALL_RESPONSE: &str = "tool-call-response";

/// Payload of a `call-tool` frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolFrame {
    /// Designer tool to run.
    pub tool_name: String,
    /// Tool arguments, forwarded verbatim.
    pub args: Value,
    /// Site the call is scoped to.
    pub site_id: SiteId,
    /// Correlation id the Designer must echo back.
    pub request_id: RequestId,
}

/// Payload of a `connection-confirmation` frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfirmation {
    /// The site id the socket was registered under.
    pub site_id: SiteId,
    /// Human-readable greeting.
    pub message: String,
}

/// Frames sent from the server to a Designer socket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerFrame {
    /// Run a tool in the Designer.
    CallTool(CallToolFrame),
    /// Registration succeeded.
    ConnectionConfirmation(ConnectionConfirmation),
    /// Free-text error notice.
    Error(String),
}

impl ServerFrame {
    /// Serialize to the JSON text sent over the socket.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Payload of a `tool-call-response` frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResponse {
    /// Echoed correlation id.
    pub request_id: RequestId,
    /// The Designer's result, passed to the caller verbatim.
    #[serde(default)]
    pub data: Value,
}

/// A decoded peer→server frame.
#[derive(Clone, Debug, PartialEq)]
pub enum PeerFrame {
    /// Answer to a dispatched call.
    ToolCallResponse(ToolCallResponse),
    /// Any other well-formed frame, identified by its `type`.
    Other(String),
}

/// Why an inbound frame could not be decoded.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Not JSON, or not an object.
    #[error("frame is not a JSON object: {0}")]
    NotJson(#[from] serde_json::Error),
    /// JSON object without a string `type`.
    #[error("frame has no type")]
    MissingType,
    /// A `tool-call-response` whose payload does not match the schema.
    #[error("invalid tool-call-response payload: {0}")]
    InvalidResponse(serde_json::Error),
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    frame_type: Option<String>,
    #[serde(default)]
    data: Value,
}

/// Decode one inbound text frame.
pub fn parse_peer_frame(text: &str) -> Result<PeerFrame, FrameError> {
    let raw: RawFrame = serde_json::from_str(text)?;
    let frame_type = raw.frame_type.ok_or(FrameError::MissingType)?;
    if frame_type == TOOL_CALL_RESPONSE {
        let response: ToolCallResponse =
            serde_json::from_value(raw.data).map_err(FrameError::InvalidResponse)?;
        Ok(PeerFrame::ToolCallResponse(response))
    } else {
        Ok(PeerFrame::Other(frame_type))
    }
}
