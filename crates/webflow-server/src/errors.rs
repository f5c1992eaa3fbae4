//! Server error types.

/// Failures starting or running the bridge server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configured address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was tried.
        addr: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Every port in the configured range is taken.
    #[error("no free port in {start}-{end}")]
    NoFreePort {
        /// First port tried.
        start: u16,
        /// Last port tried.
        end: u16,
    },
    /// The Prometheus recorder could not be installed.
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
    /// Any other I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Build a [`ServerError::Bind`] for `addr`.
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}
