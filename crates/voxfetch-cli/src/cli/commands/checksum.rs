//! Checksum command: compute SHA-256 of a file.

use anyhow::{Context, Result};
use std::path::Path;
use voxfetch_core::verify;

/// Compute and print SHA-256 of the given file.
pub async fn run_checksum(path: &Path) -> Result<()> {
    let owned = path.to_path_buf();
    let digest = tokio::task::spawn_blocking(move || verify::sha256_path(&owned))
        .await
        .context("checksum task join")?
        .with_context(|| format!("read {}", path.display()))?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
