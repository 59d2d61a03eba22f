//! Runtime configuration.
//!
//! Sources are layered: defaults, then an optional YAML file, then environment
//! variables (`TONE_*`). The credential is deliberately not resolved here; the
//! rewrite client looks it up lazily on first use.

use crate::cache::CacheConfig;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";
pub const DEFAULT_MODEL: &str = "mistral-small-latest";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:4000";
/// Upper bound for `cache_ttl_secs` (30 days).
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// Explicit credential. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
    /// Hold results for confirmation instead of applying them directly.
    pub enable_preview: bool,
    /// Where the client session persists its state.
    pub state_path: Option<PathBuf>,
    /// Tone endpoint used by the HTTP client transport.
    pub server_url: String,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.4,
            max_tokens: 800,
            cache_capacity: 500,
            cache_ttl_secs: 600,
            http_timeout_secs: 30,
            enable_preview: false,
            state_path: None,
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|s| s.trim().parse::<T>().ok())
}

impl ToneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        let cfg = base.apply_env_from(|name| env::var(name).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Overlay values from an environment-like lookup. Unparseable values are ignored.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("TONE_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup("TONE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = lookup("TONE_MODEL") {
            self.model = model;
        }
        if let Some(n) = parse_var::<usize>(&lookup, "TONE_CACHE_CAPACITY") {
            self.cache_capacity = n;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "TONE_CACHE_TTL_SECS") {
            self.cache_ttl_secs = secs;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "TONE_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = secs;
        }
        if let Some(flag) = lookup("TONE_ENABLE_PREVIEW") {
            self.enable_preview = matches!(flag.trim(), "1" | "true" | "yes");
        }
        if let Some(path) = lookup("TONE_STATE_PATH") {
            self.state_path = Some(PathBuf::from(path));
        }
        if let Some(url) = lookup("TONE_SERVER_URL") {
            self.server_url = url;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("base_url", &self.base_url), ("server_url", &self.server_url)] {
            url::Url::parse(value).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid URL: {}", e),
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_source("config"),
                )
            })?;
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::configuration_with_context(
                "temperature must be within 0.0..=2.0",
                ErrorContext::new()
                    .with_field_path("temperature")
                    .with_details(self.temperature.to_string()),
            ));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(Error::configuration_with_context(
                format!("cache_ttl_secs must be at most {}", MAX_CACHE_TTL_SECS),
                ErrorContext::new()
                    .with_field_path("cache_ttl_secs")
                    .with_details(self.cache_ttl_secs.to_string()),
            ));
        }
        if self.max_tokens == 0 {
            return Err(Error::configuration_with_context(
                "max_tokens must be positive",
                ErrorContext::new().with_field_path("max_tokens"),
            ));
        }
        Ok(())
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_enable_preview(mut self, enable: bool) -> Self {
        self.enable_preview = enable;
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(path.into());
        self
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .with_capacity(self.cache_capacity)
            .with_ttl(Duration::from_secs(self.cache_ttl_secs))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }
}
