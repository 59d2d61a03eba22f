//! Cache key generation.

use crate::types::ToneAxes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Canonical fingerprint of a `(text, normalized axes)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub hash: String,
}

impl CacheKey {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Fields are collected into a sorted map before hashing, so the key does
    /// not depend on field order.
    pub fn fingerprint(text: &str, axes: &ToneAxes) -> Self {
        let mut parts: BTreeMap<&str, &str> = BTreeMap::new();
        parts.insert("text", text);
        parts.insert("formality", axes.formality.as_str());
        parts.insert("verbosity", axes.verbosity.as_str());
        let canonical = serde_json::to_string(&parts).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Self::new(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
