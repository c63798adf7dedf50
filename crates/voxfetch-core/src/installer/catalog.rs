//! Selection key -> fetch spec lookup for one source.

use std::collections::BTreeMap;

use crate::config::CatalogEntry;
use crate::error::{ErrorKind, InstallFailure};
use crate::request::{FetchSpec, Source};

/// Catalog entries of a single source, injected into its installer.
#[derive(Debug, Clone)]
pub struct CatalogTable {
    source: Source,
    entries: BTreeMap<String, CatalogEntry>,
}

impl CatalogTable {
    pub fn new(source: Source, entries: BTreeMap<String, CatalogEntry>) -> Self {
        Self { source, entries }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn entry(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Fetch spec for `key`. Unknown keys and entries without a URL fail
    /// with `UnknownSelection`.
    pub fn resolve(&self, key: &str) -> Result<FetchSpec, InstallFailure> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| InstallFailure::unknown_selection(self.source, key))?;
        let url = entry.url.trim();
        if url.is_empty() {
            return Err(InstallFailure::new(
                ErrorKind::UnknownSelection,
                format!("{} option has no download URL: {}", self.source, key),
            ));
        }
        Ok(FetchSpec {
            url: url.to_string(),
            expected_size_bytes: entry.size_bytes,
            checksum: entry
                .sha256
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_ascii_lowercase),
        })
    }
}
