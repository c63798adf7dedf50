use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::request::Source;

/// Kokoro-82M v1.0 ONNX export used by the built-in Kokoro catalog.
pub const KOKORO_82M_URL: &str =
    "https://huggingface.co/onnx-community/Kokoro-82M-v1.0-ONNX/resolve/main/kokoro-v1_0.onnx?download=true";

/// One downloadable voice asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub url: String,
    /// Exact asset size in bytes, checked after download when set.
    #[serde(default)]
    pub size_bytes: Option<u64>,
    /// Hex SHA-256 of the asset, checked after download when set.
    #[serde(default)]
    pub sha256: Option<String>,
    /// Language code for single-file models (e.g. "en"). Archives carry their own.
    #[serde(default)]
    pub language: Option<String>,
    /// Country code for single-file models (e.g. "US").
    #[serde(default)]
    pub country: Option<String>,
}

impl CatalogEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Per-source selection key -> asset tables (`[catalog.kokoro]` etc. in config.toml).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub piper: BTreeMap<String, CatalogEntry>,
    #[serde(default)]
    pub coqui: BTreeMap<String, CatalogEntry>,
    #[serde(default)]
    pub kokoro: BTreeMap<String, CatalogEntry>,
}

impl CatalogConfig {
    /// Catalog shipped with the application: the three Kokoro en-US sizes.
    pub fn builtin() -> Self {
        let mut kokoro = BTreeMap::new();
        for key in [
            "Kokoro Small (82M) – en-US",
            "Kokoro Medium – en-US",
            "Kokoro Large – en-US",
        ] {
            kokoro.insert(
                key.to_string(),
                CatalogEntry {
                    url: KOKORO_82M_URL.to_string(),
                    language: Some("en".to_string()),
                    country: Some("US".to_string()),
                    ..CatalogEntry::default()
                },
            );
        }
        Self {
            kokoro,
            ..Self::default()
        }
    }

    pub fn entries(&self, source: Source) -> &BTreeMap<String, CatalogEntry> {
        match source {
            Source::Piper => &self.piper,
            Source::Coqui => &self.coqui,
            Source::Kokoro => &self.kokoro,
        }
    }

    pub fn entries_mut(&mut self, source: Source) -> &mut BTreeMap<String, CatalogEntry> {
        match source {
            Source::Piper => &mut self.piper,
            Source::Coqui => &mut self.coqui,
            Source::Kokoro => &mut self.kokoro,
        }
    }
}

/// Global configuration loaded from `~/.config/voxfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoxConfig {
    /// Directory that receives installed voices (None = XDG data dir).
    #[serde(default)]
    pub voices_root: Option<PathBuf>,
    /// Seconds allowed to establish a connection.
    pub connect_timeout_secs: u64,
    /// Seconds the transfer may stall (no bytes received) before it is aborted.
    pub read_timeout_secs: u64,
    /// Receive chunk size in bytes.
    pub chunk_size_bytes: usize,
    /// Maximum number of redirects followed per download.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
    /// Download catalog; if missing, the built-in catalog is used.
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

fn default_max_redirects() -> u32 {
    10
}

impl Default for VoxConfig {
    fn default() -> Self {
        Self {
            voices_root: None,
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
            chunk_size_bytes: 8 * 1024,
            max_redirects: default_max_redirects(),
            catalog: Some(CatalogConfig::builtin()),
        }
    }
}

impl VoxConfig {
    /// Catalog from config, or the built-in one.
    pub fn catalog(&self) -> CatalogConfig {
        self.catalog.clone().unwrap_or_else(CatalogConfig::builtin)
    }

    /// Configured voices root, or `~/.local/share/voxfetch/voices`.
    pub fn voices_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.voices_root {
            return Ok(root.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("voxfetch")?;
        Ok(xdg_dirs.get_data_home().join("voices"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("voxfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VoxConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<VoxConfig> {
    if !path.exists() {
        let default_cfg = VoxConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: VoxConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = VoxConfig::default();
        assert_eq!(cfg.connect_timeout_secs, 30);
        assert_eq!(cfg.read_timeout_secs, 30);
        assert_eq!(cfg.chunk_size_bytes, 8192);
        assert_eq!(cfg.max_redirects, 10);
        assert_eq!(cfg.catalog().kokoro.len(), 3);
    }

    #[test]
    fn config_toml_roundtrip_keeps_catalog_keys() {
        let cfg = VoxConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: VoxConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.read_timeout_secs, cfg.read_timeout_secs);
        let kokoro = parsed.catalog().kokoro;
        let small = kokoro.get("Kokoro Small (82M) – en-US").unwrap();
        assert_eq!(small.url, KOKORO_82M_URL);
        assert_eq!(small.language.as_deref(), Some("en"));
    }

    #[test]
    fn missing_catalog_falls_back_to_builtin() {
        let toml = r#"
            connect_timeout_secs = 5
            read_timeout_secs = 10
            chunk_size_bytes = 16384
        "#;
        let cfg: VoxConfig = toml::from_str(toml).unwrap();
        assert!(cfg.catalog.is_none());
        assert_eq!(cfg.max_redirects, 10);
        assert_eq!(cfg.catalog(), CatalogConfig::builtin());
    }

    #[test]
    fn custom_catalog_tables() {
        let toml = r#"
            voices_root = "/srv/voices"
            connect_timeout_secs = 30
            read_timeout_secs = 30
            chunk_size_bytes = 8192

            [catalog.piper."Amy (en_US, low)"]
            url = "https://example.com/en_US-amy-low.zip"
            size_bytes = 1024
            sha256 = "abc123"
        "#;
        let cfg: VoxConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.voices_root().unwrap(), PathBuf::from("/srv/voices"));
        let catalog = cfg.catalog();
        assert!(catalog.kokoro.is_empty());
        let amy = catalog.entries(Source::Piper).get("Amy (en_US, low)").unwrap();
        assert_eq!(amy.size_bytes, Some(1024));
        assert_eq!(amy.sha256.as_deref(), Some("abc123"));
        assert!(amy.language.is_none());
    }

    #[test]
    fn load_or_init_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.chunk_size_bytes, 8192);
        let again = load_or_init_at(&path).unwrap();
        assert_eq!(again.catalog(), cfg.catalog());
    }
}
