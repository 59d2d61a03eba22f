//! HTTP client for a chat-completions rewrite service.

use super::credential::{default_lookup, validate_credential, CredentialLookup};
use super::prompt::build_messages;
use super::Rewriter;
use crate::config::ToneConfig;
use crate::types::{Message, ToneAxes};
use crate::{Error, ErrorContext, Result, SERVICE_FAILURE_MESSAGE};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error};
use uuid::Uuid;

const CHAT_PATH: &str = "/v1/chat/completions";

/// Fixed generation settings. Low temperature, bounded output.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl From<&ToneConfig> for RewriteOptions {
    fn from(cfg: &ToneConfig) -> Self {
        Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            timeout: cfg.http_timeout(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
    max_tokens: u32,
}

/// Validated connection handle. Immutable once built.
struct RewriteHandle {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

/// Rewrites text through an external chat-completions API.
///
/// The credential is validated on first use. A successfully built handle is
/// kept for the life of the client; a failed attempt is not cached, so the
/// next call validates again.
pub struct ChatRewriteClient {
    options: RewriteOptions,
    lookup: CredentialLookup,
    handle: OnceCell<RewriteHandle>,
}

impl ChatRewriteClient {
    pub fn new(config: &ToneConfig) -> Self {
        Self::with_lookup(RewriteOptions::from(config), default_lookup(config.api_key.clone()))
    }

    pub fn with_lookup(options: RewriteOptions, lookup: CredentialLookup) -> Self {
        Self {
            options,
            lookup,
            handle: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }

    async fn handle(&self) -> Result<&RewriteHandle> {
        self.handle
            .get_or_try_init(|| async {
                let api_key = validate_credential((self.lookup)())?;
                let http = reqwest::Client::builder()
                    .timeout(self.options.timeout)
                    .build()
                    .map_err(|e| {
                        error!("failed to build rewrite HTTP client: {}", e);
                        Error::configuration_with_context(
                            "failed to build HTTP client",
                            ErrorContext::new().with_source("rewrite_client"),
                        )
                    })?;
                debug!(endpoint = %self.options.base_url, "rewrite client initialized");
                Ok::<_, Error>(RewriteHandle {
                    http,
                    api_key,
                    endpoint: format!("{}{}", self.options.base_url, CHAT_PATH),
                })
            })
            .await
    }

    fn service_failure(request_id: &str) -> Error {
        Error::service_with_context(
            SERVICE_FAILURE_MESSAGE,
            ErrorContext::new()
                .with_source("rewrite_client")
                .with_details(format!("request {}", request_id)),
        )
    }
}

#[async_trait]
impl Rewriter for ChatRewriteClient {
    async fn rewrite(&self, text: &str, axes: &ToneAxes) -> Result<String> {
        let handle = self.handle().await?;
        let messages = build_messages(text, axes);
        let body = ChatCompletionRequest {
            model: &self.options.model,
            messages: &messages,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        };
        let request_id = Uuid::new_v4().to_string();
        debug!(%request_id, axes = %axes, "sending rewrite request");

        let response = handle
            .http
            .post(&handle.endpoint)
            .bearer_auth(&handle.api_key)
            .header("x-request-id", &request_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(%request_id, "rewrite transport error: {}", e);
                Self::service_failure(&request_id)
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(%request_id, %status, "rewrite service error: {}", detail);
            return Err(Self::service_failure(&request_id));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            error!(%request_id, "unreadable rewrite response: {}", e);
            Self::service_failure(&request_id)
        })?;

        let output = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or_default();
        if output.is_empty() {
            return Err(Error::upstream_empty(
                ErrorContext::new()
                    .with_source("rewrite_client")
                    .with_details(format!("request {}", request_id)),
            ));
        }
        Ok(output.to_string())
    }
}
