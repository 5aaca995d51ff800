//! Resolution error taxonomy.
//!
//! Every failure the stream pipeline can observe maps onto one of these
//! variants. None of them ever reach the end user: the pipeline turns them
//! into an empty result and reports them on the diagnostic channel.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while resolving streams or listing catalogs.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Transport failure, timeout, or non-2xx status.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Expected structural absence (no descriptor, no token, no backends).
    #[error("not found: {0}")]
    NotFound(String),

    /// Upstream answered with something other than the expected shape.
    #[error("malformed upstream response from {url}: {message}")]
    MalformedUpstream { url: String, message: String },

    /// The overall resolution deadline elapsed.
    #[error("resolution deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl ResolveError {
    pub(crate) fn network(url: &str, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if let Some(status) = err.status() {
            format!("HTTP {status}")
        } else {
            err.to_string()
        };
        Self::Network {
            url: url.to_string(),
            message,
        }
    }

    pub(crate) fn malformed(url: &str, message: impl Into<String>) -> Self {
        Self::MalformedUpstream {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// `true` for the normal "nothing here" branch.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
