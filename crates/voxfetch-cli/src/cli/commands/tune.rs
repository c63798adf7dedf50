//! `voxfetch tune` – adjust synthesis parameters of an installed voice.

use anyhow::{bail, Result};
use voxfetch_core::voice_db::{VoiceDb, VoiceKey, VoiceParams};

pub async fn run_tune(
    db: &VoiceDb,
    name: &str,
    lang: &str,
    country: &str,
    pitch: Option<f32>,
    speed: Option<f32>,
    gain: Option<f32>,
) -> Result<()> {
    let key = VoiceKey::new(name, lang, country);
    let Some(current) = db.get_voice(&key).await? else {
        bail!("no installed voice {}", key);
    };
    let params = VoiceParams {
        pitch: pitch.unwrap_or(current.pitch),
        speed: speed.unwrap_or(current.speed),
        gain: gain.unwrap_or(current.gain),
    };
    if params.speed <= 0.0 || params.gain < 0.0 {
        bail!("speed must be > 0 and gain >= 0");
    }
    db.update_params(&key, params).await?;
    println!(
        "{}: pitch {:.2}, speed {:.2}, gain {:.2}",
        key, params.pitch, params.speed, params.gain
    );
    Ok(())
}
