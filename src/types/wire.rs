//! Transport-agnostic request/response bodies for the tone endpoint.

use super::axes::RawAxes;
use serde::{Deserialize, Serialize};

/// Incoming request: `{ text, axes?: { formality?, verbosity? } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneRequest {
    /// Absent text deserializes to `None` so it can be rejected by field name.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<RawAxes>,
}

impl ToneRequest {
    pub fn new(text: impl Into<String>, axes: Option<RawAxes>) -> Self {
        Self {
            text: Some(text.into()),
            axes,
        }
    }
}

/// Success body: `{ text }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneResponse {
    pub text: String,
}

/// Failure body: `{ error }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Either body, tagged with the HTTP status it should be sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToneReply {
    Ok(ToneResponse),
    Failed { status: u16, body: ErrorResponse },
}

impl ToneReply {
    pub fn status(&self) -> u16 {
        match self {
            ToneReply::Ok(_) => 200,
            ToneReply::Failed { status, .. } => *status,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ToneReply::Ok(body) => serde_json::json!({ "text": body.text }),
            ToneReply::Failed { body, .. } => serde_json::json!({ "error": body.error }),
        }
    }
}
