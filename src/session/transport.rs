//! How the session reaches the coordinator.

use crate::config::ToneConfig;
use crate::coordinator::RequestCoordinator;
use crate::types::{ErrorResponse, GridDescriptor, ToneAxes, ToneRequest, ToneResponse};
use crate::{Error, ErrorContext, Result, TransportError, SERVICE_FAILURE_MESSAGE};
use async_trait::async_trait;
use tracing::{debug, warn};

/// One tone transformation round trip. Dropping the returned future abandons
/// the request.
#[async_trait]
pub trait ToneTransport: Send + Sync {
    async fn transform(&self, text: &str, axes: ToneAxes) -> Result<String>;
}

/// In-process transport: calls the coordinator directly.
#[async_trait]
impl ToneTransport for RequestCoordinator {
    async fn transform(&self, text: &str, axes: ToneAxes) -> Result<String> {
        self.handle(&ToneRequest::new(text, Some(axes.into()))).await
    }
}

/// Talks to a remote tone endpoint over HTTP.
pub struct HttpToneTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpToneTransport {
    pub fn new(config: &ToneConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    fn unreachable_service(e: reqwest::Error) -> Error {
        warn!("tone endpoint unreachable: {}", e);
        Error::service_with_context(
            SERVICE_FAILURE_MESSAGE,
            ErrorContext::new().with_source("http_transport"),
        )
    }

    /// Fetch the liveness descriptor.
    pub async fn health(&self) -> Result<GridDescriptor> {
        let url = format!("{}/api/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::unreachable_service)?;
        response.json().await.map_err(Self::unreachable_service)
    }
}

#[async_trait]
impl ToneTransport for HttpToneTransport {
    async fn transform(&self, text: &str, axes: ToneAxes) -> Result<String> {
        let url = format!("{}/api/tone", self.base_url);
        debug!(%url, axes = %axes, "posting tone request");
        let response = self
            .client
            .post(&url)
            .json(&ToneRequest::new(text, Some(axes.into())))
            .send()
            .await
            .map_err(Self::unreachable_service)?;

        let status = response.status();
        if status.is_success() {
            let body: ToneResponse = response.json().await.map_err(Self::unreachable_service)?;
            return Ok(body.text);
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|b| b.error)
            .unwrap_or_else(|_| "Tone service error".to_string());
        let ctx = ErrorContext::new()
            .with_source("http_transport")
            .with_details(format!("HTTP {}", status.as_u16()));
        if status.is_client_error() {
            Err(Error::validation_with_context(message, ctx))
        } else {
            Err(Error::service_with_context(message, ctx))
        }
    }
}
