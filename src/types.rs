use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MosaicError;

/// One entry in the model registry. Fields the backend omits are filled
/// with `"Unknown"`; only `id` is load-bearing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub publisher: String,
    pub family: String,
    pub version: String,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            publisher: "Unknown".to_string(),
            family: "Unknown".to_string(),
            version: "Unknown".to_string(),
        }
    }
}

/// Allowed output dimensions for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Size256,
    #[serde(rename = "512x512")]
    Size512,
    #[serde(rename = "1024x1024")]
    Size1024,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::Size256 => "256x256",
            ImageSize::Size512 => "512x512",
            ImageSize::Size1024 => "1024x1024",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = MosaicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "256x256" => Ok(ImageSize::Size256),
            "512x512" => Ok(ImageSize::Size512),
            "1024x1024" => Ok(ImageSize::Size1024),
            other => Err(MosaicError::InvalidResponse(format!(
                "unsupported image size: {other}"
            ))),
        }
    }
}

/// A generated image as returned by the endpoint: base64-encoded payload,
/// opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub b64_json: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ModelTiming {
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

/// Terminal state of a single model's unit of work within a session.
/// Created pending at session start, transitions exactly once to success
/// (`image` set) or failure (`failed` set with `error`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<GeneratedImage>,
    pub timing: ModelTiming,
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationOutcome {
    pub(crate) fn pending(model_id: impl Into<String>, started_at_ms: u64) -> Self {
        Self {
            model_id: model_id.into(),
            image: None,
            timing: ModelTiming {
                started_at_ms,
                completed_at_ms: None,
                elapsed_ms: None,
            },
            failed: false,
            error: None,
        }
    }

    /// Pending means neither terminal state has been applied yet.
    pub fn is_pending(&self) -> bool {
        !self.failed && self.image.is_none()
    }
}

/// Aggregate state for one submitted prompt's generation run, spanning all
/// selected models. Replaced wholesale when the next run starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationSession {
    pub prompt: String,
    pub results: Vec<GenerationOutcome>,
    pub is_loading: bool,
}

impl GenerationSession {
    pub(crate) fn begin(prompt: impl Into<String>, model_ids: &[String], started_at_ms: u64) -> Self {
        Self {
            prompt: prompt.into(),
            results: model_ids
                .iter()
                .map(|id| GenerationOutcome::pending(id, started_at_ms))
                .collect(),
            is_loading: true,
        }
    }

    pub fn result_for(&self, model_id: &str) -> Option<&GenerationOutcome> {
        self.results.iter().find(|r| r.model_id == model_id)
    }

    pub fn failed_models(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.failed)
            .map(|r| r.model_id.as_str())
            .collect()
    }

    /// `(model_id, message)` for every failed entry.
    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.results
            .iter()
            .filter_map(|r| {
                r.error
                    .as_deref()
                    .map(|message| (r.model_id.as_str(), message))
            })
            .collect()
    }

    pub fn is_settled(&self) -> bool {
        !self.is_loading && !self.results.is_empty()
    }
}
