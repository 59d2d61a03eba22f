use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path of the offending input (e.g., "axes.formality", "text")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the allowed value set)
    pub details: Option<String>,
    /// Source of the error (e.g., "coordinator", "rewrite_client")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Coarse status category an error maps to at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Bad input (HTTP 400).
    BadRequest,
    /// Dependent service failed (HTTP 502).
    BadGateway,
    /// Anything else (HTTP 500).
    Internal,
}

impl StatusClass {
    pub fn http_status(self) -> u16 {
        match self {
            StatusClass::BadRequest => 400,
            StatusClass::BadGateway => 502,
            StatusClass::Internal => 500,
        }
    }
}

/// Unified error type for the tone runtime.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Upstream returned an empty response{}", format_context(.context))]
    UpstreamEmpty { context: ErrorContext },

    #[error("Service failure: {message}{}", format_context(.context))]
    Service {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Transport-level failures. These are internal and never returned verbatim
/// across the service boundary.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

/// Message shown for any upstream failure. Internal causes are logged, not returned.
pub const SERVICE_FAILURE_MESSAGE: &str = "Tone service failed";

impl Error {
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn service_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Service {
            message: msg.into(),
            context,
        }
    }

    pub fn upstream_empty(context: ErrorContext) -> Self {
        Error::UpstreamEmpty { context }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Validation { context, .. }
            | Error::Configuration { context, .. }
            | Error::Service { context, .. }
            | Error::UpstreamEmpty { context } => Some(context),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Validation errors are the caller's fault; everything from the rewrite
    /// path is a dependent-service failure.
    pub fn status_class(&self) -> StatusClass {
        match self {
            Error::Validation { .. } => StatusClass::BadRequest,
            Error::Configuration { .. }
            | Error::UpstreamEmpty { .. }
            | Error::Service { .. }
            | Error::Transport(_) => StatusClass::BadGateway,
            Error::Io(_) | Error::Serialization(_) | Error::Yaml(_) => StatusClass::Internal,
        }
    }

    /// Message that is safe to hand to an end user.
    ///
    /// Validation messages name the offending field and are returned verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { message, .. } => message.clone(),
            Error::Service { message, .. } => message.clone(),
            Error::Configuration { .. } | Error::UpstreamEmpty { .. } | Error::Transport(_) => {
                SERVICE_FAILURE_MESSAGE.to_string()
            }
            Error::Io(_) | Error::Serialization(_) | Error::Yaml(_) => "Internal error".to_string(),
        }
    }
}
