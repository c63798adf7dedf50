//! Types stored in the voice registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One installed voice as the synthesis engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceRecord {
    pub name: String,
    pub language_code: String,
    pub country_code: String,
    pub pitch: f32,
    pub speed: f32,
    pub gain: f32,
    /// Engine family: "piper", "coqui" or "kokoro".
    pub model_type: String,
    /// Directory holding the voice files, when the voice owns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<PathBuf>,
}

impl VoiceRecord {
    /// Record with neutral synthesis parameters (pitch 0, speed 1, gain 1).
    pub fn new(
        name: impl Into<String>,
        language_code: impl Into<String>,
        country_code: impl Into<String>,
        model_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            language_code: language_code.into(),
            country_code: country_code.into(),
            pitch: 0.0,
            speed: 1.0,
            gain: 1.0,
            model_type: model_type.into(),
            folder: None,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn key(&self) -> VoiceKey {
        VoiceKey::new(&self.name, &self.language_code, &self.country_code)
    }
}

/// Registry identity of a voice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoiceKey {
    pub name: String,
    pub language_code: String,
    pub country_code: String,
}

impl VoiceKey {
    pub fn new(name: &str, language_code: &str, country_code: &str) -> Self {
        Self {
            name: name.to_string(),
            language_code: language_code.to_string(),
            country_code: country_code.to_string(),
        }
    }
}

impl fmt::Display for VoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}_{})", self.name, self.language_code, self.country_code)
    }
}

/// Synthesis parameters a user may tune after install.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub pitch: f32,
    pub speed: f32,
    pub gain: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            speed: 1.0,
            gain: 1.0,
        }
    }
}
