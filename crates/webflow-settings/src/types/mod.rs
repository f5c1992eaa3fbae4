//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a partial
//! settings file only needs the fields it changes.

mod api;
mod server;

pub use api::*;
pub use server::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "server": { "port": 1400, "mode": "multi-tenant" },
///   "auth": { "jwtSecret": "..." }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebflowSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// Designer bridge hosting.
    pub server: ServerSettings,
    /// Designer connection token verification (multi-tenant only).
    pub auth: AuthSettings,
    /// Webflow Data API access.
    pub api: ApiSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl Default for WebflowSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "webflow-mcp".to_string(),
            server: ServerSettings::default(),
            auth: AuthSettings::default(),
            api: ApiSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl WebflowSettings {
    /// Reject combinations the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        let server = &self.server;
        if let Some(range) = server.port_range {
            if range.start > range.end {
                return Err(SettingsError::EmptyPortRange {
                    start: range.start,
                    end: range.end,
                });
            }
        }
        check_range("server.heartbeatIntervalMs", server.heartbeat_interval_ms)?;
        check_range("server.heartbeatTimeoutMs", server.heartbeat_timeout_ms)?;
        if server.heartbeat_timeout_ms < server.heartbeat_interval_ms {
            return Err(SettingsError::HeartbeatTimeoutTooShort {
                timeout_ms: server.heartbeat_timeout_ms,
                interval_ms: server.heartbeat_interval_ms,
            });
        }
        if server.mode == BridgeMode::MultiTenant
            && self.auth.jwt_secret.as_deref().is_none_or(str::is_empty)
        {
            return Err(SettingsError::MissingJwtSecret);
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: u64) -> Result<()> {
    if (HEARTBEAT_MS_MIN..=HEARTBEAT_MS_MAX).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            field,
            value,
            min: HEARTBEAT_MS_MIN,
            max: HEARTBEAT_MS_MAX,
        })
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (`trace`..`error`). `RUST_LOG` takes precedence.
    pub level: String,
    /// `compact` or `json`.
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let s: WebflowSettings =
            serde_json::from_str(r#"{"server": {"port": 4000}}"#).unwrap();
        assert_eq!(s.server.port, 4000);
        assert_eq!(s.server.host, "127.0.0.1");
        assert_eq!(s.logging.level, "info");
    }

    #[test]
    fn camel_case_wire_names() {
        let v = serde_json::to_value(WebflowSettings::default()).unwrap();
        assert!(v["server"].get("heartbeatIntervalMs").is_some());
        assert!(v["api"].get("baseUrl").is_some());
    }

    #[test]
    fn defaults_validate() {
        assert!(WebflowSettings::default().validate().is_ok());
    }

    #[test]
    fn empty_port_range_is_rejected() {
        let mut s = WebflowSettings::default();
        s.server.port_range = Some(PortRange { start: 2000, end: 1000 });
        assert!(matches!(
            s.validate(),
            Err(SettingsError::EmptyPortRange { start: 2000, end: 1000 })
        ));
    }

    #[test]
    fn zero_heartbeat_interval_is_rejected() {
        let mut s = WebflowSettings::default();
        s.server.heartbeat_interval_ms = 0;
        assert!(matches!(
            s.validate(),
            Err(SettingsError::OutOfRange { field: "server.heartbeatIntervalMs", value: 0, .. })
        ));
    }

    #[test]
    fn heartbeat_timeout_bounds() {
        let mut s = WebflowSettings::default();
        s.server.heartbeat_timeout_ms = HEARTBEAT_MS_MAX + 1;
        assert!(matches!(s.validate(), Err(SettingsError::OutOfRange { .. })));

        s.server.heartbeat_interval_ms = 10_000;
        s.server.heartbeat_timeout_ms = 5_000;
        assert!(matches!(
            s.validate(),
            Err(SettingsError::HeartbeatTimeoutTooShort { timeout_ms: 5_000, interval_ms: 10_000 })
        ));

        s.server.heartbeat_timeout_ms = 10_000;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn multi_tenant_requires_secret() {
        let mut s = WebflowSettings::default();
        s.server.mode = BridgeMode::MultiTenant;
        assert!(matches!(s.validate(), Err(SettingsError::MissingJwtSecret)));
        s.auth.jwt_secret = Some(String::new());
        assert!(s.validate().is_err());
        s.auth.jwt_secret = Some("shh".into());
        assert!(s.validate().is_ok());
    }
}
