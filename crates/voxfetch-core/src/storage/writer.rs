//! Sequential writer for an in-progress download.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};

use super::TEMP_SUFFIX;

/// Append-only temp file for one download. The file is deleted when the
/// writer (or the `TempPath` it converts into) is dropped.
pub struct AssetWriter {
    file: NamedTempFile,
    written: u64,
}

impl AssetWriter {
    /// Create `asset-<random>.part` in `dir`.
    pub fn create_in(dir: &Path) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("asset-")
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        Ok(Self { file, written: 0 })
    }

    /// Append one received chunk.
    pub fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.as_file_mut().write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Flush file data to disk before verification reads it back.
    pub fn sync(&self) -> Result<()> {
        self.file.as_file().sync_all().context("storage sync failed")?;
        Ok(())
    }

    /// Close the file handle, keeping delete-on-drop for the path.
    pub fn into_temp_path(self) -> TempPath {
        self.file.into_temp_path()
    }
}
