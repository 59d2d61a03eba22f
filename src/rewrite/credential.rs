//! Credential lookup and validation for the rewrite service.

use crate::{Error, ErrorContext, Result};
use keyring::Entry;
use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::sync::Arc;

pub const KEYRING_SERVICE: &str = "tone-grid";
pub const KEYRING_USER: &str = "mistral";

/// Yields the raw credential, if any. Called once per initialization attempt.
pub type CredentialLookup = Arc<dyn Fn() -> Option<String> + Send + Sync>;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(<.*>|\$\{.*\}|x+|your[-_ ]?(api[-_ ]?)?key.*|changeme|placeholder|todo|none|null|sk-\.\.\.)$")
        .expect("placeholder pattern must compile")
});

/// Explicit key first, then the OS keyring, then `MISTRAL_API_KEY`.
pub fn default_lookup(explicit: Option<String>) -> CredentialLookup {
    Arc::new(move || {
        if let Some(k) = explicit.clone() {
            return Some(k);
        }
        if let Ok(entry) = Entry::new(KEYRING_SERVICE, KEYRING_USER) {
            if let Ok(key) = entry.get_password() {
                return Some(key);
            }
        }
        env::var("MISTRAL_API_KEY").ok()
    })
}

pub fn is_placeholder(key: &str) -> bool {
    PLACEHOLDER.is_match(key.trim())
}

pub fn validate_credential(raw: Option<String>) -> Result<String> {
    let ctx = || {
        ErrorContext::new()
            .with_field_path("api_key")
            .with_source("rewrite_client")
    };
    let key = raw.map(|k| k.trim().to_string()).unwrap_or_default();
    if key.is_empty() {
        return Err(Error::configuration_with_context(
            "rewrite service credential is missing",
            ctx(),
        ));
    }
    if is_placeholder(&key) {
        return Err(Error::configuration_with_context(
            "rewrite service credential is a placeholder",
            ctx(),
        ));
    }
    Ok(key)
}
