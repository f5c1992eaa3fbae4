//! Errors from loading and validating settings.

use thiserror::Error;

/// Why settings could not be loaded or accepted.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON for [`WebflowSettings`](crate::WebflowSettings).
    #[error("malformed settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `server.portRange` has `start > end`.
    #[error("server.portRange {start}-{end} contains no port")]
    EmptyPortRange {
        /// First port.
        start: u16,
        /// Last port.
        end: u16,
    },

    /// A numeric setting is outside its accepted bounds.
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        /// Wire name of the setting.
        field: &'static str,
        /// Rejected value.
        value: u64,
        /// Lowest accepted value.
        min: u64,
        /// Highest accepted value.
        max: u64,
    },

    /// The heartbeat timeout would fire before the first ping is due.
    #[error("server.heartbeatTimeoutMs ({timeout_ms}) is shorter than server.heartbeatIntervalMs ({interval_ms})")]
    HeartbeatTimeoutTooShort {
        /// Configured timeout.
        timeout_ms: u64,
        /// Configured interval.
        interval_ms: u64,
    },

    /// Multi-tenant mode has no token secret to verify Designer sockets with.
    #[error("multi-tenant mode requires auth.jwtSecret")]
    MissingJwtSecret,
}

/// Result alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
