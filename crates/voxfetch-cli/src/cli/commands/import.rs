//! `voxfetch import <path>` – install a voice from local files.

use anyhow::{anyhow, Result};
use std::path::Path;
use voxfetch_core::config::VoxConfig;
use voxfetch_core::voice_db::VoiceDb;
use voxfetch_core::AssetPipeline;

pub async fn run_import(cfg: &VoxConfig, db: VoiceDb, path: &Path) -> Result<()> {
    let pipeline = AssetPipeline::from_config(cfg, db)?;
    let record = pipeline
        .import_local(path)
        .await
        .map_err(|f| anyhow!("{} ({})", f.user_message(), f))?;
    println!(
        "Imported {} ({}_{}, {})",
        record.name, record.language_code, record.country_code, record.model_type
    );
    Ok(())
}
