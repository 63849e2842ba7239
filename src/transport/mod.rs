//! Network transport used by each path attempt
//!
//! The race only needs two things from the network: issue a GET for a
//! concrete address (bound to that attempt's cancellation token) and, for the
//! winner alone, read the body. [`HttpTransport`] does this with reqwest.

pub mod http;

pub use http::{HttpConfig, HttpTransport};

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a single attempt failed. Recovered locally by the race.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// A response whose status was a success and whose body is not yet read
    type Response: Send;

    /// Issue a GET for `address`. Must resolve promptly with
    /// [`TransportError::Cancelled`] once `cancel` fires; a non-success status
    /// is an error.
    async fn send(&self, address: &str, cancel: CancellationToken) -> Result<Self::Response>;

    /// Materialize the body of a response returned by [`Transport::send`]
    async fn read_body(&self, response: Self::Response) -> Result<String>;
}
