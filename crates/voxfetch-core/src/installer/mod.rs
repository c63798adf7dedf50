//! Installer plugins: per-source URL resolution and on-disk voice layout.
//!
//! The registry maps a `Source` to its plugin. A plugin resolves a selection
//! key against its injected catalog table and, once the asset is downloaded
//! and verified, turns it into voice files under the voices root.

mod archive;
mod catalog;
pub(crate) mod extract;
mod kokoro;
pub mod layout;

pub use archive::ArchiveInstaller;
pub use catalog::CatalogTable;
pub use kokoro::KokoroInstaller;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::error::InstallFailure;
use crate::request::{FetchSpec, InstallRequest, Source};
use crate::storage::StorageLayout;
use crate::voice_db::VoiceRecord;

/// What an installer needs besides the asset itself.
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub selection_key: String,
    pub layout: StorageLayout,
}

/// Per-source plugin. `install` runs on the blocking pool and may do
/// synchronous file I/O.
pub trait Installer: Send + Sync {
    fn source(&self) -> Source;

    /// URL, size and checksum for a selection key. Must not touch the network.
    fn resolve_spec(&self, selection_key: &str) -> Result<FetchSpec, InstallFailure>;

    /// Install the verified asset at `asset` and describe the resulting voice.
    fn install(&self, asset: &Path, ctx: &InstallContext) -> Result<VoiceRecord, InstallFailure>;

    /// Selection keys this plugin can resolve.
    fn selections(&self) -> Vec<String>;
}

/// Source -> installer plugin.
#[derive(Clone, Default)]
pub struct InstallerRegistry {
    plugins: HashMap<Source, Arc<dyn Installer>>,
}

impl InstallerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kokoro, Piper and Coqui plugins over the given catalog.
    pub fn from_catalog(catalog: &CatalogConfig) -> Self {
        Self::new()
            .with_installer(Arc::new(KokoroInstaller::new(CatalogTable::new(
                Source::Kokoro,
                catalog.kokoro.clone(),
            ))))
            .with_installer(Arc::new(ArchiveInstaller::new(CatalogTable::new(
                Source::Piper,
                catalog.piper.clone(),
            ))))
            .with_installer(Arc::new(ArchiveInstaller::new(CatalogTable::new(
                Source::Coqui,
                catalog.coqui.clone(),
            ))))
    }

    /// Register (or replace) the plugin for `installer.source()`.
    pub fn with_installer(mut self, installer: Arc<dyn Installer>) -> Self {
        self.plugins.insert(installer.source(), installer);
        self
    }

    pub fn installer(&self, source: Source) -> Option<Arc<dyn Installer>> {
        self.plugins.get(&source).cloned()
    }

    /// Plugin and fetch spec for a request; `UnknownSelection` when either is missing.
    pub fn resolve(
        &self,
        req: &InstallRequest,
    ) -> Result<(Arc<dyn Installer>, FetchSpec), InstallFailure> {
        let installer = self
            .installer(req.source)
            .ok_or_else(|| InstallFailure::unknown_selection(req.source, &req.selection_key))?;
        let spec = installer.resolve_spec(&req.selection_key)?;
        Ok((installer, spec))
    }

    /// Selection keys for `source`, sorted. Empty when no plugin is registered.
    pub fn selections(&self, source: Source) -> Vec<String> {
        self.plugins
            .get(&source)
            .map(|p| p.selections())
            .unwrap_or_default()
    }
}

/// Install a local zip, `.onnx` file or voice directory, detecting Piper vs Coqui.
pub fn install_local(path: &Path, layout: &StorageLayout) -> Result<VoiceRecord, InstallFailure> {
    if !path.exists() {
        return Err(InstallFailure::io(format!("no such file: {}", path.display())));
    }
    archive::install_from_path(path, layout, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn builtin_catalog_resolves_kokoro_only() {
        let reg = InstallerRegistry::from_catalog(&CatalogConfig::builtin());
        let (inst, spec) = reg
            .resolve(&InstallRequest::new(Source::Kokoro, "Kokoro Medium – en-US"))
            .unwrap();
        assert_eq!(inst.source(), Source::Kokoro);
        assert_eq!(spec.url, crate::config::KOKORO_82M_URL);
        assert_eq!(reg.selections(Source::Kokoro).len(), 3);
        assert!(reg.selections(Source::Piper).is_empty());

        let err = reg
            .resolve(&InstallRequest::new(Source::Piper, "Amy"))
            .err()
            .unwrap();
        assert_eq!(err.kind, ErrorKind::UnknownSelection);
    }

    #[test]
    fn missing_plugin_is_unknown_selection() {
        let reg = InstallerRegistry::new();
        let err = reg
            .resolve(&InstallRequest::new(Source::Kokoro, "Kokoro Small (82M) – en-US"))
            .err()
            .unwrap();
        assert_eq!(err.kind, ErrorKind::UnknownSelection);
        assert_eq!(
            err.message,
            "unknown kokoro option: Kokoro Small (82M) – en-US"
        );
    }

    #[test]
    fn install_local_missing_path() {
        let root = tempfile::tempdir().unwrap();
        let layout = StorageLayout::open(root.path()).unwrap();
        let err = install_local(&root.path().join("nope.zip"), &layout).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}
