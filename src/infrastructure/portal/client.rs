//! Portal HTTP client.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, warn};

use crate::domain::errors::PortalError;
use crate::domain::ports::{PortalMethod, PortalPort, PortalRequest, PortalResponse};
use crate::infrastructure::config::{PortalConfig, ResolverConfig};

/// reqwest-backed [`PortalPort`].
///
/// Holds no cookie store: session state travels on each request.
#[derive(Clone)]
pub struct PortalHttpClient {
    client: Client,
}

impl PortalHttpClient {
    /// Creates a client with the configured user agent and timeouts.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(portal: &PortalConfig, resolver: &ResolverConfig) -> Result<Self, PortalError> {
        let client = Client::builder()
            .user_agent(portal.user_agent.as_str())
            .timeout(resolver.request_timeout())
            .connect_timeout(resolver.connect_timeout())
            .build()
            .map_err(|e| PortalError::Other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

fn map_send_error(e: &reqwest::Error) -> PortalError {
    if e.is_timeout() {
        PortalError::Timeout
    } else if e.is_connect() {
        PortalError::Connect(e.to_string())
    } else if e.is_builder() {
        PortalError::InvalidRequest(e.to_string())
    } else {
        PortalError::Other(e.to_string())
    }
}

#[async_trait]
impl PortalPort for PortalHttpClient {
    async fn send(&self, request: &PortalRequest) -> Result<PortalResponse, PortalError> {
        let mut builder = match request.method {
            PortalMethod::Get => self.client.get(&request.url),
            PortalMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        debug!(method = ?request.method, url = %request.url, "Sending portal request");

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, url = %request.url, "Portal request failed");
            map_send_error(&e)
        })?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let body: Bytes = response.bytes().await.map_err(|e| {
            warn!(error = %e, url = %url, "Failed to read portal response body");
            map_send_error(&e)
        })?;

        debug!(status, url = %url, size = body.len(), "Portal response received");

        Ok(PortalResponse {
            status,
            url,
            headers,
            body,
        })
    }
}
