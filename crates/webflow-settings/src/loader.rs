//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`WebflowSettings::default()`]
//! 2. If `~/.webflow-mcp/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{BridgeMode, HEARTBEAT_MS_MAX, HEARTBEAT_MS_MIN, PortRange, WebflowSettings};

/// Resolve the path to the settings file (`~/.webflow-mcp/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".webflow-mcp").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<WebflowSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<WebflowSettings> {
    let mut settings = read_layers(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Defaults merged with the file at `path`, without env overrides.
fn read_layers(path: &Path) -> Result<WebflowSettings> {
    let defaults = serde_json::to_value(WebflowSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `WEBFLOW_*` environment overrides.
///
/// Invalid values are logged and ignored (file/default value is kept).
pub fn apply_env_overrides(settings: &mut WebflowSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup` (tests pass a map instead of the
/// process environment).
pub fn apply_overrides_from(
    settings: &mut WebflowSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read("WEBFLOW_MCP_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read("WEBFLOW_MCP_PORT") {
        match parse_u16_range(&v, 0, 65535) {
            Some(port) => settings.server.port = port,
            None => warn_invalid("WEBFLOW_MCP_PORT", &v),
        }
    }
    if let Some(v) = read("WEBFLOW_MCP_PORT_RANGE") {
        match PortRange::parse(&v) {
            Some(range) => settings.server.port_range = Some(range),
            None => warn_invalid("WEBFLOW_MCP_PORT_RANGE", &v),
        }
    }
    if let Some(v) = read("WEBFLOW_MCP_MODE") {
        match BridgeMode::parse(&v) {
            Some(mode) => settings.server.mode = mode,
            None => warn_invalid("WEBFLOW_MCP_MODE", &v),
        }
    }
    if let Some(v) = read("WEBFLOW_MCP_PUBLIC_URL") {
        settings.server.public_url = Some(v);
    }
    if let Some(v) = read("WEBFLOW_MCP_HEARTBEAT_INTERVAL_MS") {
        match parse_u64_range(&v, HEARTBEAT_MS_MIN, HEARTBEAT_MS_MAX) {
            Some(ms) => settings.server.heartbeat_interval_ms = ms,
            None => warn_invalid("WEBFLOW_MCP_HEARTBEAT_INTERVAL_MS", &v),
        }
    }

    // ── Auth ────────────────────────────────────────────────────────
    if let Some(v) = read("WEBFLOW_MCP_JWT_SECRET") {
        settings.auth.jwt_secret = Some(v);
    }
    if let Some(v) = read("WEBFLOW_MCP_JWT_ISSUER") {
        settings.auth.jwt_issuer = Some(v);
    }

    // ── Data API ────────────────────────────────────────────────────
    if let Some(v) = read("WEBFLOW_TOKEN") {
        settings.api.token = Some(v);
    }
    if let Some(v) = read("WEBFLOW_API_BASE_URL") {
        settings.api.base_url = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read("WEBFLOW_MCP_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read("WEBFLOW_MCP_LOG_FORMAT") {
        settings.logging.format = v;
    }
}

fn warn_invalid(key: &str, value: &str) {
    tracing::warn!(key, value, "invalid env var, ignoring");
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}
