//! `voxfetch list` – show installed voices.

use anyhow::Result;
use voxfetch_core::voice_db::VoiceDb;

pub async fn run_list(db: &VoiceDb, json: bool) -> Result<()> {
    let voices = db.list_voices().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&voices)?);
        return Ok(());
    }
    if voices.is_empty() {
        println!("No voices installed.");
        return Ok(());
    }
    println!(
        "{:<36} {:<6} {:<8} {:>6} {:>6} {:>6}",
        "NAME", "LANG", "TYPE", "PITCH", "SPEED", "GAIN"
    );
    for v in voices {
        println!(
            "{:<36} {:<6} {:<8} {:>6.2} {:>6.2} {:>6.2}",
            v.name,
            format!("{}_{}", v.language_code, v.country_code),
            v.model_type,
            v.pitch,
            v.speed,
            v.gain
        );
    }
    Ok(())
}
