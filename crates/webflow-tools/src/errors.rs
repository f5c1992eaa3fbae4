//! Tool error types.

use thiserror::Error;

/// Errors a tool can fail with. The MCP layer renders every variant as an
/// `isError` text result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments did not match the tool's schema.
    #[error("validation error: {message}")]
    Validation {
        /// What was wrong.
        message: String,
    },

    /// The `action` argument named something the tool does not do.
    #[error("unknown action: {action}")]
    UnknownAction {
        /// The action that was asked for.
        action: String,
    },

    /// The tool needs configuration that is missing.
    #[error("not configured: {message}")]
    NotConfigured {
        /// What is missing.
        message: String,
    },

    /// The Data API request never produced a response.
    #[error("request failed: {message}")]
    Http {
        /// Transport-level failure.
        message: String,
    },

    /// The Data API answered with a non-success status.
    #[error("Webflow API returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
}

impl ToolError {
    /// Shorthand for [`ToolError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http {
            message: e.to_string(),
        }
    }
}
