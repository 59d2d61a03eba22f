//! Server-side request coordination.
//!
//! Validates and normalizes a [`ToneRequest`], answers from the cache when it
//! can, and otherwise delegates to a [`Rewriter`], caching only successes.
//!
//! Concurrent identical requests are not coalesced: both miss, both call
//! upstream, and the later write replaces the earlier entry.

use crate::cache::{CacheKey, CacheStats, CacheStore};
use crate::config::ToneConfig;
use crate::rewrite::{ChatRewriteClient, Rewriter};
use crate::types::{ErrorResponse, GridDescriptor, ToneAxes, ToneReply, ToneRequest, ToneResponse};
use crate::{Error, ErrorContext, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

pub struct RequestCoordinator {
    cache: Mutex<CacheStore>,
    rewriter: Arc<dyn Rewriter>,
}

impl RequestCoordinator {
    pub fn new(cache: CacheStore, rewriter: Arc<dyn Rewriter>) -> Self {
        Self {
            cache: Mutex::new(cache),
            rewriter,
        }
    }

    /// Production wiring: cache sized from config, chat client as rewriter.
    pub fn from_config(config: &ToneConfig) -> Self {
        Self::new(
            CacheStore::new(config.cache_config()),
            Arc::new(ChatRewriteClient::new(config)),
        )
    }

    /// Validate, normalize, then answer from cache or upstream.
    pub async fn handle(&self, request: &ToneRequest) -> Result<String> {
        let text = validate_text(request.text.as_deref())?;
        let axes = ToneAxes::normalize(request.axes.as_ref())?;
        self.rewrite_normalized(text, axes).await
    }

    /// Entry point for already-validated axes.
    pub async fn rewrite_normalized(&self, text: &str, axes: ToneAxes) -> Result<String> {
        let key = CacheKey::fingerprint(text, &axes);
        let cached = self.lock_cache()?.get(&key);
        if let Some(hit) = cached {
            debug!(key = %key, "tone cache hit");
            return Ok(hit);
        }
        debug!(key = %key, axes = %axes, "tone cache miss");

        // The lock is not held across the upstream call.
        let output = self.rewriter.rewrite(text, &axes).await.map_err(|e| {
            error!(axes = %axes, "tone rewrite failed: {}", e);
            e
        })?;
        self.lock_cache()?.set(key, output.clone());
        Ok(output)
    }

    /// Run `handle` and shape the outcome into a status-tagged body.
    pub async fn respond(&self, request: &ToneRequest) -> ToneReply {
        match self.handle(request).await {
            Ok(text) => ToneReply::Ok(ToneResponse { text }),
            Err(e) => {
                if e.is_validation() {
                    warn!("rejected tone request: {}", e);
                }
                ToneReply::Failed {
                    status: e.status_class().http_status(),
                    body: ErrorResponse {
                        error: e.user_message(),
                    },
                }
            }
        }
    }

    /// Liveness check. No side effects.
    pub fn health(&self) -> GridDescriptor {
        GridDescriptor::current()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache
            .lock()
            .map(|c| c.stats())
            .unwrap_or_default()
    }

    fn lock_cache(&self) -> Result<std::sync::MutexGuard<'_, CacheStore>> {
        self.cache.lock().map_err(|_| {
            Error::service_with_context(
                "cache unavailable",
                ErrorContext::new().with_source("coordinator"),
            )
        })
    }
}

fn validate_text(text: Option<&str>) -> Result<&str> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t.trim()),
        _ => Err(Error::validation_with_context(
            "Invalid or missing \"text\" field",
            ErrorContext::new()
                .with_field_path("text")
                .with_source("coordinator"),
        )),
    }
}
