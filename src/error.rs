//! Error types shared by the palette engine.
//!
//! Failures never cross the reducer: the handler turns them into `String`
//! payloads on result actions, and the reducer degrades to an empty list or a
//! toast.

use thiserror::Error;

/// Failures talking to the host environment's Web API.
///
/// `Clone` so that a single memoized metadata fetch can hand the same failure
/// to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("request to {url} failed with HTTP {status}")]
    Http { status: u16, url: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl HostError {
    /// True when the host refused the request for lack of privileges.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, HostError::Http { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for HostError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HostError::Decode(err.to_string())
        } else {
            HostError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored value for key {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("no reply to {0} within the allotted time")]
    Timeout(String),

    #[error("channel closed before a reply to {0} arrived")]
    Closed(String),

    #[error("malformed {kind} payload: {reason}")]
    Malformed { kind: String, reason: String },

    #[error("background rejected message: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("no environment configured; pass --org or set org_url in the config file")]
    MissingOrg,

    #[error("environment url {0} is not an absolute http(s) origin")]
    InvalidOrg(String),
}
