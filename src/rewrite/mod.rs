//! # Rewrite Module
//!
//! Connector to the external text-rewriting service.
//!
//! The [`Rewriter`] trait is the seam the coordinator depends on; production
//! code uses [`ChatRewriteClient`], tests substitute fakes. Rewriters do no
//! caching and no retries: one failed attempt is surfaced immediately.

pub mod client;
pub mod credential;
pub mod prompt;

pub use client::{ChatRewriteClient, RewriteOptions};
pub use credential::{default_lookup, is_placeholder, validate_credential, CredentialLookup};
pub use prompt::{build_messages, build_prompt, RULES, SYSTEM_PROMPT};

use crate::types::ToneAxes;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Rewriter: Send + Sync {
    /// Rewrite `text` in the tone described by `axes`. Returns trimmed, non-empty text.
    async fn rewrite(&self, text: &str, axes: &ToneAxes) -> Result<String>;
}
