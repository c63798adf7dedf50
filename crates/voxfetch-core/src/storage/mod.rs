//! Voices root layout and scratch file lifecycle.
//!
//! Everything in flight lives under `<voices_root>/.scratch`: downloaded
//! assets (`asset-*.part`) and archive staging directories (`stage-*`).
//! Both are backed by `tempfile` handles, so they are removed when the
//! handle drops on any path that does not hand them off. Entries untouched
//! for `STALE_SCRATCH_AGE` were left by a crashed process; younger ones may
//! belong to a run in another pipeline or process and are kept.

mod writer;

pub use writer::AssetWriter;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Scratch subdirectory name under the voices root.
pub const SCRATCH_DIR: &str = ".scratch";

/// Suffix of in-progress downloads.
pub const TEMP_SUFFIX: &str = ".part";

/// Scratch entries not modified for this long are treated as abandoned.
pub const STALE_SCRATCH_AGE: Duration = Duration::from_secs(60 * 60);

/// Directory layout of installed voices. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Create the voices root and scratch dir if missing, and remove
    /// scratch entries left behind by a crashed process.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let layout = Self { root: root.into() };
        fs::create_dir_all(layout.scratch_dir())
            .with_context(|| format!("create scratch dir under {}", layout.root.display()))?;
        let removed = layout.clear_stale_scratch(STALE_SCRATCH_AGE)?;
        if removed > 0 {
            tracing::info!(removed, "removed stale scratch entries");
        }
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.root.join(SCRATCH_DIR)
    }

    /// Directory for one installed voice: `<root>/<group...>/<lang><COUNTRY>/<leaf>`.
    pub fn voice_dir(&self, group: Option<&str>, lang: &str, country: &str, leaf: &str) -> PathBuf {
        let mut dir = self.root.clone();
        if let Some(g) = group {
            dir.push(g);
        }
        dir.push(format!("{}{}", lang, country));
        dir.push(sanitize_component(leaf));
        dir
    }

    /// Fresh uniquely named download target in the scratch dir.
    pub fn new_asset(&self) -> Result<AssetWriter> {
        AssetWriter::create_in(&self.scratch_dir())
    }

    /// Fresh uniquely named staging directory, removed when dropped.
    pub fn new_staging_dir(&self) -> Result<tempfile::TempDir> {
        tempfile::Builder::new()
            .prefix("stage-")
            .tempdir_in(self.scratch_dir())
            .with_context(|| format!("create staging dir in {}", self.scratch_dir().display()))
    }

    /// Number of entries currently in the scratch dir.
    pub fn scratch_entries(&self) -> Result<usize> {
        Ok(fs::read_dir(self.scratch_dir())?.count())
    }

    /// Remove scratch entries last modified at least `max_age` ago.
    /// Returns how many were removed.
    pub fn clear_stale_scratch(&self, max_age: Duration) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(self.scratch_dir())? {
            let entry = entry?;
            let path = entry.path();
            let age = entry
                .metadata()
                .and_then(|m| m.modified())
                .map(|t| t.elapsed().unwrap_or(Duration::ZERO))
                .unwrap_or(Duration::ZERO);
            if age < max_age {
                continue;
            }
            let res = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match res {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(path = %path.display(), "remove stale scratch entry: {}", e),
            }
        }
        Ok(removed)
    }

    /// True if `path` is strictly inside the voices root (and not the scratch dir).
    /// Paths with `.` or `..` components below the root are never inside.
    pub fn contains(&self, path: &Path) -> bool {
        let Ok(rest) = path.strip_prefix(&self.root) else {
            return false;
        };
        let mut parts = rest.components().peekable();
        parts.peek().is_some()
            && parts.all(|c| matches!(c, Component::Normal(_)))
            && !path.starts_with(self.scratch_dir())
    }
}

/// Reduce a display name to a single safe path component.
pub fn sanitize_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            out.push(c);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    let trimmed = out.trim_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        "voice".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_component_collapses_separators() {
        assert_eq!(
            sanitize_component("Kokoro Small (82M) – en-US"),
            "Kokoro-Small-82M-en-US"
        );
        assert_eq!(sanitize_component("en_US-amy-low"), "en_US-amy-low");
        assert_eq!(sanitize_component("../.."), "voice");
        assert_eq!(sanitize_component(""), "voice");
    }

    #[test]
    fn voice_dir_layout() {
        let layout = StorageLayout {
            root: PathBuf::from("/v"),
        };
        assert_eq!(
            layout.voice_dir(Some("kokoro"), "en", "US", "Kokoro Large – en-US"),
            PathBuf::from("/v/kokoro/enUS/Kokoro-Large-en-US")
        );
        assert_eq!(
            layout.voice_dir(None, "de", "DE", "de_DE-thorsten-low"),
            PathBuf::from("/v/deDE/de_DE-thorsten-low")
        );
    }

    #[test]
    fn open_clears_only_stale_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("voices");
        let scratch = root.join(SCRATCH_DIR);
        fs::create_dir_all(scratch.join("stage-live")).unwrap();
        fs::write(scratch.join("asset-live.part"), b"x").unwrap();
        let old = fs::File::create(scratch.join("asset-old.part")).unwrap();
        old.set_modified(std::time::SystemTime::now() - 2 * STALE_SCRATCH_AGE)
            .unwrap();
        drop(old);

        let layout = StorageLayout::open(&root).unwrap();
        assert_eq!(layout.scratch_entries().unwrap(), 2);
        assert!(!scratch.join("asset-old.part").exists());
        assert!(scratch.join("asset-live.part").is_file());
        assert!(scratch.join("stage-live").is_dir());

        assert_eq!(layout.clear_stale_scratch(Duration::ZERO).unwrap(), 2);
        assert_eq!(layout.scratch_entries().unwrap(), 0);
    }

    #[test]
    fn staging_dir_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::open(dir.path()).unwrap();
        let staging = layout.new_staging_dir().unwrap();
        assert!(staging.path().is_dir());
        assert_eq!(layout.scratch_entries().unwrap(), 1);
        drop(staging);
        assert_eq!(layout.scratch_entries().unwrap(), 0);
    }

    #[test]
    fn contains_excludes_root_and_scratch() {
        let layout = StorageLayout {
            root: PathBuf::from("/v"),
        };
        assert!(layout.contains(Path::new("/v/enUS/amy")));
        assert!(!layout.contains(Path::new("/v")));
        assert!(!layout.contains(Path::new("/v/.scratch/x")));
        assert!(!layout.contains(Path::new("/other/enUS")));
        assert!(!layout.contains(Path::new("/v/../x")));
        assert!(!layout.contains(Path::new("/v/enUS/../../etc")));
        assert!(!layout.contains(Path::new("/vx/enUS")));
    }
}
