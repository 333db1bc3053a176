//! Transport error types for portal exchanges.

use thiserror::Error;

/// Portal transport error variants.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum PortalError {
    #[error("request timed out")]
    Timeout,

    #[error("failed to connect to portal: {0}")]
    Connect(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Other(String),
}

impl PortalError {
    /// Returns whether the request never produced a response in time.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}
