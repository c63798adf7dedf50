//! Recognize Piper / Coqui voice layouts and copy them into the voices root.
//!
//! - Piper: `*.onnx` plus `*.onnx.json`
//! - Coqui: `*.onnx` plus `config.json`
//!
//! Files are matched case-insensitively during a sorted recursive walk, so
//! the choice is stable when an archive carries more than one candidate.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::InstallFailure;
use crate::request::Source;
use crate::storage::StorageLayout;
use crate::voice_db::VoiceRecord;

/// A recognized voice inside a staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceLayout {
    pub source: Source,
    pub model: PathBuf,
    pub config: PathBuf,
}

impl VoiceLayout {
    /// Model file name without `.onnx` (`en_US-amy-low`).
    pub fn base_name(&self) -> String {
        let name = self
            .model
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match name.len().checked_sub(".onnx".len()) {
            Some(cut) if name.is_char_boundary(cut) => name[..cut].to_string(),
            _ => name,
        }
    }
}

fn lower_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// All regular files under `dir`, depth-first, sorted per directory.
pub fn walk_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());
    let mut out = Vec::new();
    for entry in entries {
        let ty = entry.file_type()?;
        if ty.is_dir() {
            out.extend(walk_files(&entry.path())?);
        } else if ty.is_file() {
            out.push(entry.path());
        }
    }
    Ok(out)
}

/// Detect the voice layout under `dir`. Piper wins when both configs are present.
pub fn detect(dir: &Path) -> io::Result<Option<VoiceLayout>> {
    let files = walk_files(dir)?;
    let Some(model) = files.iter().find(|p| lower_name(p).ends_with(".onnx")) else {
        return Ok(None);
    };
    if let Some(cfg) = files.iter().find(|p| lower_name(p).ends_with(".onnx.json")) {
        return Ok(Some(VoiceLayout {
            source: Source::Piper,
            model: model.clone(),
            config: cfg.clone(),
        }));
    }
    if let Some(cfg) = files.iter().find(|p| lower_name(p) == "config.json") {
        return Ok(Some(VoiceLayout {
            source: Source::Coqui,
            model: model.clone(),
            config: cfg.clone(),
        }));
    }
    Ok(None)
}

/// Like `detect`, but a missing layout is an install error.
pub fn require(dir: &Path) -> Result<VoiceLayout, InstallFailure> {
    detect(dir)?.ok_or_else(|| {
        InstallFailure::install(
            "no supported voice files found; expected Piper (.onnx + .onnx.json) \
             or Coqui (.onnx + config.json)",
        )
    })
}

/// `en_US-amy-low` -> ("en", "US"). Anything else falls back to ("en", "US").
pub fn derive_lang_country(base: &str) -> (String, String) {
    let prefix = base.split('-').next().unwrap_or_default();
    let parts: Vec<&str> = prefix.split('_').collect();
    match parts.as_slice() {
        [lang, country] if !lang.is_empty() && !country.is_empty() => {
            (lang.to_string(), country.to_string())
        }
        _ => ("en".to_string(), "US".to_string()),
    }
}

/// Copy model and config into `<root>/<lang><COUNTRY>/<base>/` and build the record.
/// A voice directory created here is removed again if copying fails.
pub fn place(found: &VoiceLayout, storage: &StorageLayout) -> Result<VoiceRecord, InstallFailure> {
    let raw = fs::read(&found.config)?;
    if serde_json::from_slice::<serde_json::Value>(&raw).is_err() {
        return Err(InstallFailure::install(format!(
            "voice config is not valid JSON: {}",
            found.config.display()
        )));
    }

    let base = found.base_name();
    let (lang, country) = derive_lang_country(&base);
    let dir = storage.voice_dir(None, &lang, &country, &base);
    let created = !dir.exists();

    let copy = || -> io::Result<()> {
        fs::create_dir_all(&dir)?;
        for src in [&found.model, &found.config] {
            if let Some(name) = src.file_name() {
                fs::copy(src, dir.join(name))?;
            }
        }
        Ok(())
    };
    if let Err(e) = copy() {
        if created {
            let _ = fs::remove_dir_all(&dir);
        }
        return Err(InstallFailure::io(format!(
            "copy voice files into {}: {}",
            dir.display(),
            e
        )));
    }

    tracing::info!(voice = %base, dir = %dir.display(), source = %found.source, "voice files placed");
    Ok(VoiceRecord::new(base, lang, country, found.source.as_str()).with_folder(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path, data: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    #[test]
    fn lang_country_from_model_name() {
        assert_eq!(
            derive_lang_country("en_US-amy-low"),
            ("en".to_string(), "US".to_string())
        );
        assert_eq!(
            derive_lang_country("de_DE-thorsten-medium"),
            ("de".to_string(), "DE".to_string())
        );
        assert_eq!(derive_lang_country("model"), ("en".to_string(), "US".to_string()));
        assert_eq!(
            derive_lang_country("zh_CN_x-voice"),
            ("en".to_string(), "US".to_string())
        );
    }

    #[test]
    fn detects_piper_layout() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("v/en_US-amy-low.onnx"), b"m");
        touch(&dir.path().join("v/en_US-amy-low.onnx.json"), b"{}");
        let found = detect(dir.path()).unwrap().unwrap();
        assert_eq!(found.source, Source::Piper);
        assert_eq!(found.base_name(), "en_US-amy-low");
    }

    #[test]
    fn detects_coqui_layout_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Model.ONNX"), b"m");
        touch(&dir.path().join("config.json"), b"{}");
        let found = detect(dir.path()).unwrap().unwrap();
        assert_eq!(found.source, Source::Coqui);
        assert_eq!(found.base_name(), "Model");
    }

    #[test]
    fn model_without_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("only.onnx"), b"m");
        assert!(detect(dir.path()).unwrap().is_none());
        let err = require(dir.path()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Install);
    }

    #[test]
    fn place_copies_into_voice_dir() {
        let stage = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let storage = StorageLayout::open(root.path()).unwrap();
        touch(&stage.path().join("de_DE-thorsten-low.onnx"), b"model");
        touch(&stage.path().join("de_DE-thorsten-low.onnx.json"), b"{\"audio\":{}}");

        let found = require(stage.path()).unwrap();
        let rec = place(&found, &storage).unwrap();
        assert_eq!(rec.name, "de_DE-thorsten-low");
        assert_eq!((rec.language_code.as_str(), rec.country_code.as_str()), ("de", "DE"));
        assert_eq!(rec.model_type, "piper");
        let folder = rec.folder.unwrap();
        assert_eq!(folder, root.path().join("deDE").join("de_DE-thorsten-low"));
        assert_eq!(fs::read(folder.join("de_DE-thorsten-low.onnx")).unwrap(), b"model");
        assert!(folder.join("de_DE-thorsten-low.onnx.json").is_file());
    }

    #[test]
    fn invalid_config_json_rejected_without_leftovers() {
        let stage = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let storage = StorageLayout::open(root.path()).unwrap();
        touch(&stage.path().join("en_US-x.onnx"), b"model");
        touch(&stage.path().join("config.json"), b"not json");

        let found = require(stage.path()).unwrap();
        let err = place(&found, &storage).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Install);
        assert!(!root.path().join("enUS").exists());
    }
}
