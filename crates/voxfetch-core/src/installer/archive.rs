//! Piper and Coqui: the asset is a zip archive (or a bare model with its config).

use std::path::Path;

use super::catalog::CatalogTable;
use super::{extract, layout, InstallContext, Installer};
use crate::error::InstallFailure;
use crate::request::{FetchSpec, Source};
use crate::storage::StorageLayout;
use crate::voice_db::VoiceRecord;

pub struct ArchiveInstaller {
    catalog: CatalogTable,
}

impl ArchiveInstaller {
    /// `catalog.source()` decides which layout this installer accepts.
    pub fn new(catalog: CatalogTable) -> Self {
        Self { catalog }
    }
}

/// Stage `asset` (zip, `.onnx` file or directory) and install whatever voice it holds.
/// `expect` restricts the accepted layout to one source.
pub(crate) fn install_from_path(
    asset: &Path,
    storage: &StorageLayout,
    expect: Option<Source>,
) -> Result<VoiceRecord, InstallFailure> {
    let staging = storage
        .new_staging_dir()
        .map_err(|e| InstallFailure::io(format!("{:#}", e)))?;

    if asset.is_dir() {
        extract::stage_dir(asset, staging.path())?;
    } else if extract::is_zip(asset)? {
        extract::extract_zip(asset, staging.path())?;
    } else {
        extract::stage_model_file(asset, staging.path())?;
    }

    let found = layout::require(staging.path())?;
    if let Some(want) = expect {
        if found.source != want {
            return Err(InstallFailure::install(format!(
                "archive holds a {} voice, expected {}",
                found.source, want
            )));
        }
    }
    let record = layout::place(&found, storage)?;
    drop(staging);
    Ok(record)
}

impl Installer for ArchiveInstaller {
    fn source(&self) -> Source {
        self.catalog.source()
    }

    fn resolve_spec(&self, selection_key: &str) -> Result<FetchSpec, InstallFailure> {
        self.catalog.resolve(selection_key)
    }

    fn selections(&self) -> Vec<String> {
        self.catalog.keys()
    }

    fn install(&self, asset: &Path, ctx: &InstallContext) -> Result<VoiceRecord, InstallFailure> {
        install_from_path(asset, &ctx.layout, Some(self.catalog.source()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::installer::extract::tests::write_zip;
    use std::collections::BTreeMap;

    fn piper() -> ArchiveInstaller {
        ArchiveInstaller::new(CatalogTable::new(Source::Piper, BTreeMap::new()))
    }

    fn ctx(layout: &StorageLayout) -> InstallContext {
        InstallContext {
            selection_key: "Amy".into(),
            layout: layout.clone(),
        }
    }

    #[test]
    fn installs_piper_zip_and_cleans_staging() {
        let root = tempfile::tempdir().unwrap();
        let layout = StorageLayout::open(root.path()).unwrap();
        let asset = root.path().join("amy.zip");
        write_zip(
            &asset,
            &[
                ("en_US-amy-low/en_US-amy-low.onnx", b"model"),
                ("en_US-amy-low/en_US-amy-low.onnx.json", b"{}"),
                ("en_US-amy-low/MODEL_CARD", b"card"),
            ],
        );

        let rec = piper().install(&asset, &ctx(&layout)).unwrap();
        assert_eq!(rec.name, "en_US-amy-low");
        assert_eq!(rec.model_type, "piper");
        assert!(rec.folder.unwrap().join("en_US-amy-low.onnx").is_file());
        assert_eq!(layout.scratch_entries().unwrap(), 0);
    }

    #[test]
    fn piper_installer_refuses_coqui_layout() {
        let root = tempfile::tempdir().unwrap();
        let layout = StorageLayout::open(root.path()).unwrap();
        let asset = root.path().join("coqui.zip");
        write_zip(&asset, &[("voice.onnx", b"m"), ("config.json", b"{}")]);

        let err = piper().install(&asset, &ctx(&layout)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Install);
        assert_eq!(layout.scratch_entries().unwrap(), 0);
        assert!(!root.path().join("enUS").exists());
    }

    #[test]
    fn non_voice_archive_is_install_error() {
        let root = tempfile::tempdir().unwrap();
        let layout = StorageLayout::open(root.path()).unwrap();
        let asset = root.path().join("junk.zip");
        write_zip(&asset, &[("readme.txt", b"hi")]);
        let err = piper().install(&asset, &ctx(&layout)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Install);
        assert!(err.message.contains("no supported voice files"));
        assert_eq!(layout.scratch_entries().unwrap(), 0);
    }

    #[test]
    fn import_from_directory_detects_coqui() {
        let root = tempfile::tempdir().unwrap();
        let layout = StorageLayout::open(root.path().join("voices")).unwrap();
        let src = root.path().join("my-voice");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("fr_FR-siwis.onnx"), b"m").unwrap();
        std::fs::write(src.join("config.json"), b"{}").unwrap();

        let rec = install_from_path(&src, &layout, None).unwrap();
        assert_eq!(rec.model_type, "coqui");
        assert_eq!((rec.language_code.as_str(), rec.country_code.as_str()), ("fr", "FR"));
    }
}
