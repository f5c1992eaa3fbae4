//! The result of one Designer call.
//!
//! A call never fails with an `Err`: every failure is a value the tool layer
//! can show to the agent as text.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::constants::{NO_CONNECTION_MESSAGE, SITE_ID_REQUIRED, TIMEOUT_MESSAGE};

/// How a Designer call ended.
///
/// Serializes with an explicit tag for the internal multi-tenant hop; use
/// [`CallOutcome::into_value`] for the caller-facing shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum CallOutcome {
    /// The first Designer response, verbatim.
    Response(Value),
    /// No site id was supplied. Nothing was sent.
    SiteIdRequired,
    /// No Designer socket is registered for the site. Nothing was sent.
    NoConnection,
    /// The call was dispatched but no response arrived in time.
    TimedOut,
}

impl CallOutcome {
    /// Whether this is one of the local error shapes.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Response(_))
    }

    /// Guidance text for the error shapes, `None` for a response.
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::Response(_) => None,
            Self::SiteIdRequired => Some(SITE_ID_REQUIRED),
            Self::NoConnection => Some(NO_CONNECTION_MESSAGE),
            Self::TimedOut => Some(TIMEOUT_MESSAGE),
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Response(_) => "response",
            Self::SiteIdRequired => "site_id_required",
            Self::NoConnection => "no_connection",
            Self::TimedOut => "timed_out",
        }
    }

    /// Caller-facing JSON.
    ///
    /// Validation and no-peer failures are `{status: false, error}`; a
    /// timeout is `{error}`; a response is the Designer payload itself.
    pub fn into_value(self) -> Value {
        match self {
            Self::Response(value) => value,
            Self::SiteIdRequired => json!({ "status": false, "error": SITE_ID_REQUIRED }),
            Self::NoConnection => json!({ "status": false, "error": NO_CONNECTION_MESSAGE }),
            Self::TimedOut => json!({ "error": TIMEOUT_MESSAGE }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_is_verbatim() {
        let out = CallOutcome::Response(json!({"ok": true}));
        assert!(!out.is_error());
        assert_eq!(out.into_value(), json!({"ok": true}));
    }

    #[test]
    fn site_id_required_shape() {
        let v = CallOutcome::SiteIdRequired.into_value();
        assert_eq!(v, json!({"status": false, "error": "Site ID is required"}));
    }

    #[test]
    fn no_connection_shape() {
        let v = CallOutcome::NoConnection.into_value();
        assert_eq!(v["status"], false);
        assert_eq!(v["error"], NO_CONNECTION_MESSAGE);
    }

    #[test]
    fn timeout_shape_has_no_status() {
        let v = CallOutcome::TimedOut.into_value();
        assert!(v.get("status").is_none());
        assert_eq!(v["error"], TIMEOUT_MESSAGE);
    }

    #[test]
    fn internal_encoding_is_tagged() {
        let out = CallOutcome::Response(json!([1, 2]));
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v, json!({"outcome": "response", "data": [1, 2]}));
        let back: CallOutcome = serde_json::from_value(v).unwrap();
        assert_eq!(back, out);

        let v = serde_json::to_value(CallOutcome::TimedOut).unwrap();
        assert_eq!(v, json!({"outcome": "timed_out"}));
    }

    #[test]
    fn labels_are_snake_case() {
        for out in [
            CallOutcome::Response(Value::Null),
            CallOutcome::SiteIdRequired,
            CallOutcome::NoConnection,
            CallOutcome::TimedOut,
        ] {
            let label = out.label();
            assert!(label.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
