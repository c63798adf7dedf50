//! `voxfetch remove <name> <lang> <country>` – remove a voice; keep its folder with --keep-files.

use anyhow::Result;
use voxfetch_core::config::VoxConfig;
use voxfetch_core::storage::StorageLayout;
use voxfetch_core::voice_db::{remove_installed_voice, VoiceDb, VoiceKey};

pub async fn run_remove(
    cfg: &VoxConfig,
    db: &VoiceDb,
    name: &str,
    lang: &str,
    country: &str,
    keep_files: bool,
) -> Result<()> {
    let key = VoiceKey::new(name, lang, country);
    let removed = if keep_files {
        db.remove_voice(&key).await?
    } else {
        let layout = StorageLayout::open(cfg.voices_root()?)?;
        remove_installed_voice(db, &layout, &key).await?
    };
    match removed {
        Some(_) => println!("Removed {}", key),
        None => println!("No installed voice {}", key),
    }
    Ok(())
}
