use super::paths::PathError;
use crate::humanize::HumanDuration;
use crate::transport::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Terminal failure of a fetch. Per-path reasons are logged, not carried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("fetch cancelled")]
    Cancelled,

    #[error("no delivery path succeeded within {}", HumanDuration(*after))]
    Timeout { after: Duration },

    #[error("all {attempts} delivery paths failed")]
    AllPathsFailed { attempts: usize },

    #[error("target resource must not be empty")]
    InvalidTarget,
}

impl FetchError {
    /// Cancellation is a superseded request, not something to show the user
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Errors constructing a fetcher
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid delivery paths: {0}")]
    Paths(#[from] PathError),

    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("race deadline must be positive")]
    ZeroDeadline,
}
