//! Tone axes: formality × verbosity.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Formality axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Formal,
    #[default]
    Neutral,
    Casual,
}

impl Formality {
    pub const ALL: [Formality; 3] = [Formality::Formal, Formality::Neutral, Formality::Casual];

    pub fn as_str(self) -> &'static str {
        match self {
            Formality::Formal => "formal",
            Formality::Neutral => "neutral",
            Formality::Casual => "casual",
        }
    }

    /// Natural-language descriptor used when instructing the rewrite model.
    pub fn descriptor(self) -> &'static str {
        match self {
            Formality::Formal => "formal, professional",
            Formality::Neutral => "neutral, plain and even-handed",
            Formality::Casual => "casual, conversational",
        }
    }

    pub fn allowed() -> String {
        join_names(Self::ALL.iter().map(|f| f.as_str()))
    }
}

/// Verbosity axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Concise,
    #[default]
    Balanced,
    Elaborate,
}

impl Verbosity {
    pub const ALL: [Verbosity; 3] = [
        Verbosity::Concise,
        Verbosity::Balanced,
        Verbosity::Elaborate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Concise => "concise",
            Verbosity::Balanced => "balanced",
            Verbosity::Elaborate => "elaborate",
        }
    }

    pub fn descriptor(self) -> &'static str {
        match self {
            Verbosity::Concise => "concise, succinct",
            Verbosity::Balanced => "balanced in length, neither terse nor padded",
            Verbosity::Elaborate => "elaborate, detailed",
        }
    }

    pub fn allowed() -> String {
        join_names(Self::ALL.iter().map(|v| v.as_str()))
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Formality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Formality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                Error::validation_with_context(
                    format!(
                        "Invalid tone axes: formality must be one of {{{}}}",
                        Self::allowed()
                    ),
                    ErrorContext::new()
                        .with_field_path("axes.formality")
                        .with_details(format!("got {:?}", s)),
                )
            })
    }
}

impl FromStr for Verbosity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                Error::validation_with_context(
                    format!(
                        "Invalid tone axes: verbosity must be one of {{{}}}",
                        Self::allowed()
                    ),
                    ErrorContext::new()
                        .with_field_path("axes.verbosity")
                        .with_details(format!("got {:?}", s)),
                )
            })
    }
}

/// A validated point on the tone grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ToneAxes {
    pub formality: Formality,
    pub verbosity: Verbosity,
}

impl ToneAxes {
    pub fn new(formality: Formality, verbosity: Verbosity) -> Self {
        Self {
            formality,
            verbosity,
        }
    }

    /// Grid cell id, e.g. `formal-concise`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.formality, self.verbosity)
    }

    /// Resolve loosely-typed wire axes. Absent fields take the neutral/balanced
    /// defaults; present fields must name an enum member.
    pub fn normalize(raw: Option<&RawAxes>) -> Result<Self> {
        let Some(raw) = raw else {
            return Ok(Self::default());
        };
        let formality = match raw.formality.as_deref() {
            Some(s) => s.parse()?,
            None => Formality::default(),
        };
        let verbosity = match raw.verbosity.as_deref() {
            Some(s) => s.parse()?,
            None => Verbosity::default(),
        };
        Ok(Self::new(formality, verbosity))
    }
}

impl fmt::Display for ToneAxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.formality, self.verbosity)
    }
}

/// Axes as they arrive on the wire: every field optional, values unchecked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAxes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<String>,
}

impl From<ToneAxes> for RawAxes {
    fn from(axes: ToneAxes) -> Self {
        Self {
            formality: Some(axes.formality.as_str().to_string()),
            verbosity: Some(axes.verbosity.as_str().to_string()),
        }
    }
}
