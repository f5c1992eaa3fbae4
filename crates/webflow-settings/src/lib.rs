//! # webflow-settings
//!
//! Configuration for the Webflow MCP server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`WebflowSettings::default()`]
//! 2. **User file**: `~/.webflow-mcp/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `WEBFLOW_*` overrides (highest priority)
//!
//! The Designer call timeout is not a setting; see
//! `webflow_core::constants::TOOL_CALL_TIMEOUT`.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
