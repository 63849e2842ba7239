//! HTTP transport for path attempts

use super::{Result, Transport, TransportError};
use crate::config::RaceConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent: "feedrace/0.1.0".to_string(),
        }
    }
}

impl From<&RaceConfig> for HttpConfig {
    fn from(race: &RaceConfig) -> Self {
        Self {
            connect_timeout: race.connect_timeout.as_duration(),
            request_timeout: race.request_timeout.as_duration(),
            user_agent: race.user_agent.clone(),
        }
    }
}

/// reqwest-backed transport. One client is shared by every attempt.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Response = reqwest::Response;

    async fn send(&self, address: &str, cancel: CancellationToken) -> Result<reqwest::Response> {
        let url = reqwest::Url::parse(address)
            .map_err(|e| TransportError::InvalidAddress(format!("{}: {}", address, e)))?;

        debug!(address, "Sending request");

        // Dropping the in-flight request future aborts the connection
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(address, "Request cancelled");
                return Err(TransportError::Cancelled);
            }
            response = self.client.get(url).send() => response.map_err(map_reqwest_error)?,
        };

        let status = response.status();
        if !status.is_success() {
            debug!(address, status = status.as_u16(), "Non-success status");
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response)
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<String> {
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Body(e.to_string())
            }
        })?;

        debug!(size = body.len(), "Body read");

        Ok(body)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}
