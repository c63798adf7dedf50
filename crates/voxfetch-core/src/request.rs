//! Install requests and the fetch specs they resolve to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Voice vendor a selection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Piper,
    Coqui,
    Kokoro,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Piper, Source::Coqui, Source::Kokoro];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Piper => "piper",
            Source::Coqui => "coqui",
            Source::Kokoro => "kokoro",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown voice source '{0}' (expected piper, coqui or kokoro)")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "piper" => Ok(Source::Piper),
            "coqui" => Ok(Source::Coqui),
            "kokoro" => Ok(Source::Kokoro),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

/// One user action: install `selection_key` from `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstallRequest {
    pub source: Source,
    pub selection_key: String,
}

/// Single-flight key; equal requests share one run.
pub type InstallKey = InstallRequest;

impl InstallRequest {
    pub fn new(source: Source, selection_key: impl Into<String>) -> Self {
        Self {
            source,
            selection_key: selection_key.into(),
        }
    }
}

impl fmt::Display for InstallRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.selection_key)
    }
}

/// Where to download an asset from and how to check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSpec {
    pub url: String,
    pub expected_size_bytes: Option<u64>,
    /// Lowercase hex SHA-256.
    pub checksum: Option<String>,
}

impl FetchSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            expected_size_bytes: None,
            checksum: None,
        }
    }
}
