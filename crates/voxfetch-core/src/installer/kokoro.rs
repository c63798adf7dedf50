//! Kokoro: the asset is a single ONNX model file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::catalog::CatalogTable;
use super::{InstallContext, Installer};
use crate::error::InstallFailure;
use crate::request::{FetchSpec, Source};
use crate::storage::sanitize_component;
use crate::voice_db::VoiceRecord;

const DEFAULT_FILE_NAME: &str = "model.onnx";

pub struct KokoroInstaller {
    catalog: CatalogTable,
}

impl KokoroInstaller {
    pub fn new(catalog: CatalogTable) -> Self {
        Self { catalog }
    }
}

/// Move `asset` to `dir/file_name`, copying when rename fails. On a failed
/// copy the partial file is removed, and `dir` too if it was created here.
fn place_model(asset: &Path, dir: &Path, file_name: &str) -> io::Result<PathBuf> {
    let created = !dir.exists();
    fs::create_dir_all(dir)?;
    let dest = dir.join(file_name);

    // Scratch lives under the voices root, so rename is the common path.
    if fs::rename(asset, &dest).is_ok() {
        return Ok(dest);
    }
    if let Err(e) = fs::copy(asset, &dest) {
        let _ = fs::remove_file(&dest);
        if created {
            let _ = fs::remove_dir_all(dir);
        }
        return Err(e);
    }
    Ok(dest)
}

/// Last non-empty path segment of `url`, query stripped.
fn file_name_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segs| segs.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .map(|s| sanitize_component(&s))
        .filter(|s| s != "voice")
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

impl Installer for KokoroInstaller {
    fn source(&self) -> Source {
        Source::Kokoro
    }

    fn resolve_spec(&self, selection_key: &str) -> Result<FetchSpec, InstallFailure> {
        self.catalog.resolve(selection_key)
    }

    fn selections(&self) -> Vec<String> {
        self.catalog.keys()
    }

    fn install(&self, asset: &Path, ctx: &InstallContext) -> Result<VoiceRecord, InstallFailure> {
        let entry = self
            .catalog
            .entry(&ctx.selection_key)
            .ok_or_else(|| InstallFailure::unknown_selection(Source::Kokoro, &ctx.selection_key))?;
        let lang = entry.language.clone().unwrap_or_else(|| "en".to_string());
        let country = entry.country.clone().unwrap_or_else(|| "US".to_string());

        if fs::metadata(asset)?.len() == 0 {
            return Err(InstallFailure::install("downloaded model is empty"));
        }

        let dir = ctx
            .layout
            .voice_dir(Some("kokoro"), &lang, &country, &ctx.selection_key);
        let dest = place_model(asset, &dir, &file_name_from_url(&entry.url)).map_err(|e| {
            InstallFailure::io(format!("place model in {}: {}", dir.display(), e))
        })?;

        tracing::info!(voice = %ctx.selection_key, path = %dest.display(), "kokoro model installed");
        Ok(VoiceRecord::new(ctx.selection_key.clone(), lang, country, "kokoro").with_folder(dir))
    }
}
