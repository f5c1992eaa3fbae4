//! Webflow Data API and connection-token settings.

use serde::{Deserialize, Serialize};

/// Webflow Data API client settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSettings {
    /// API origin.
    pub base_url: String,
    /// Bearer token for the Data API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.webflow.com".to_string(),
            token: None,
            timeout_ms: 30_000,
        }
    }
}

/// Verification of the tokens presented by Designer sockets.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSettings {
    /// HS256 shared secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
    /// Required `iss` claim, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_issuer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_not_serialized_when_absent() {
        let v = serde_json::to_value(ApiSettings::default()).unwrap();
        assert!(v.get("token").is_none());
        assert_eq!(v["timeoutMs"], 30_000);
    }

    #[test]
    fn auth_from_partial_json() {
        let a: AuthSettings = serde_json::from_str(r#"{"jwtSecret":"s"}"#).unwrap();
        assert_eq!(a.jwt_secret.as_deref(), Some("s"));
        assert!(a.jwt_issuer.is_none());
    }
}
