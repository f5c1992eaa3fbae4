//! Branded ID newtypes.
//!
//! Site ids are supplied by the outside world and never validated here.
//! Peer ids are UUID v7 (time-ordered). Request ids are minted as
//! `{siteId}-{uuidv4}` so ids from different sites never collide and a
//! stray id in a log line says which site it belonged to.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Opaque identifier of a Webflow site (one Designer project).
    SiteId
}

branded_id! {
    /// Correlation id pairing one dispatched call with its response.
    RequestId
}

branded_id! {
    /// Identifier of one live Designer socket.
    PeerId
}

impl SiteId {
    /// Parse an optional, possibly blank, site id.
    ///
    /// Returns `None` for missing, empty, or whitespace-only input.
    pub fn parse_opt(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::from)
    }

    /// Deterministic actor name for the multi-tenant host.
    #[must_use]
    pub fn actor_name(&self) -> String {
        format!("site:{}", self.0)
    }
}

impl RequestId {
    /// Mint a fresh request id scoped to `site`.
    #[must_use]
    pub fn mint(site: &SiteId) -> Self {
        Self(format!("{}-{}", site.as_str(), Uuid::new_v4()))
    }
}

impl PeerId {
    /// Create a new random peer id (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}
