//! Stage an archive or model file into a scratch directory for layout detection.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::InstallFailure;

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// True if the file starts with a zip local file header.
pub fn is_zip(path: &Path) -> io::Result<bool> {
    let mut magic = [0u8; 4];
    let mut f = File::open(path)?;
    let mut filled = 0;
    while filled < magic.len() {
        let n = f.read(&mut magic[filled..])?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(magic == ZIP_MAGIC)
}

/// Extract every entry of `archive` under `dest`. An entry whose path would
/// land outside `dest` fails the whole extraction. Returns the number of files written.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize, InstallFailure> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| InstallFailure::install(format!("invalid zip archive: {}", e)))?;

    let mut files = 0;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| InstallFailure::install(format!("read zip entry {}: {}", i, e)))?;
        let rel = match entry.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                return Err(InstallFailure::install(format!(
                    "zip entry escapes archive root: {}",
                    entry.name()
                )))
            }
        };
        let out = dest.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut w = File::create(&out)?;
        io::copy(&mut entry, &mut w)?;
        files += 1;
    }
    tracing::debug!(archive = %archive.display(), files, "archive extracted");
    Ok(files)
}

/// Copy a bare `.onnx` model into `dest`, along with the configs that sit
/// next to it (`<model>.onnx.json`, `config.json`).
pub fn stage_model_file(model: &Path, dest: &Path) -> Result<(), InstallFailure> {
    let name = model
        .file_name()
        .ok_or_else(|| InstallFailure::install(format!("not a file: {}", model.display())))?;
    fs::copy(model, dest.join(name))?;

    let mut siblings: Vec<PathBuf> = Vec::new();
    let mut piper_cfg = name.to_os_string();
    piper_cfg.push(".json");
    if let Some(dir) = model.parent() {
        siblings.push(dir.join(piper_cfg));
        siblings.push(dir.join("config.json"));
    }
    for cfg in siblings {
        if cfg.is_file() {
            if let Some(cfg_name) = cfg.file_name() {
                fs::copy(&cfg, dest.join(cfg_name))?;
            }
        }
    }
    Ok(())
}

/// Copy a directory tree into `dest` (import of an unpacked voice folder).
pub fn stage_dir(src: &Path, dest: &Path) -> io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        let ty = entry.file_type()?;
        if ty.is_dir() {
            fs::create_dir_all(&target)?;
            stage_dir(&entry.path(), &target)?;
        } else if ty.is_file() {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Write a zip with the given (name, contents) entries.
    pub(crate) fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zw = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            zw.start_file(*name, zip::write::FileOptions::default())
                .unwrap();
            zw.write_all(data).unwrap();
        }
        zw.finish().unwrap();
    }

    #[test]
    fn zip_magic_detection() {
        let dir = tempfile::tempdir().unwrap();
        let z = dir.path().join("a.zip");
        write_zip(&z, &[("x.txt", b"x")]);
        assert!(is_zip(&z).unwrap());

        let plain = dir.path().join("model.onnx");
        fs::write(&plain, b"onnx").unwrap();
        assert!(!is_zip(&plain).unwrap());

        let tiny = dir.path().join("tiny");
        fs::write(&tiny, b"PK").unwrap();
        assert!(!is_zip(&tiny).unwrap());
    }

    #[test]
    fn extracts_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        let z = dir.path().join("voice.zip");
        write_zip(
            &z,
            &[
                ("amy/en_US-amy-low.onnx", b"model"),
                ("amy/en_US-amy-low.onnx.json", b"{}"),
            ],
        );
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        assert_eq!(extract_zip(&z, &out).unwrap(), 2);
        assert_eq!(fs::read(out.join("amy/en_US-amy-low.onnx")).unwrap(), b"model");
    }

    #[test]
    fn rejects_escaping_entry() {
        let dir = tempfile::tempdir().unwrap();
        let z = dir.path().join("evil.zip");
        write_zip(&z, &[("../evil.onnx", b"x")]);
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let err = extract_zip(&z, &out).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Install);
        assert!(!dir.path().join("evil.onnx").exists());
    }

    #[test]
    fn garbage_is_install_error() {
        let dir = tempfile::tempdir().unwrap();
        let z = dir.path().join("bad.zip");
        fs::write(&z, b"PK\x03\x04 not really a zip").unwrap();
        let err = extract_zip(&z, dir.path()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Install);
    }

    #[test]
    fn stage_model_file_brings_sibling_config() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let model = src.path().join("de_DE-thorsten-low.onnx");
        fs::write(&model, b"m").unwrap();
        fs::write(src.path().join("de_DE-thorsten-low.onnx.json"), b"{}").unwrap();
        stage_model_file(&model, dest.path()).unwrap();
        assert!(dest.path().join("de_DE-thorsten-low.onnx").is_file());
        assert!(dest.path().join("de_DE-thorsten-low.onnx.json").is_file());
        assert!(!dest.path().join("config.json").exists());
    }
}
