//! Voice read operations: list and get.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::path::PathBuf;

use super::super::db::VoiceDb;
use super::super::types::{VoiceKey, VoiceRecord};

fn record_from_row(row: &SqliteRow) -> VoiceRecord {
    let pitch: f64 = row.get("pitch");
    let speed: f64 = row.get("speed");
    let gain: f64 = row.get("gain");
    let folder: Option<String> = row.get("folder");
    VoiceRecord {
        name: row.get("name"),
        language_code: row.get("language_code"),
        country_code: row.get("country_code"),
        pitch: pitch as f32,
        speed: speed as f32,
        gain: gain as f32,
        model_type: row.get("model_type"),
        folder: folder.map(PathBuf::from),
    }
}

impl VoiceDb {
    /// All installed voices, ordered by language, country, then name.
    pub async fn list_voices(&self) -> Result<Vec<VoiceRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT name, language_code, country_code, pitch, speed, gain, model_type, folder
            FROM voices
            ORDER BY language_code, country_code, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    pub async fn get_voice(&self, key: &VoiceKey) -> Result<Option<VoiceRecord>> {
        let row = sqlx::query(
            r#"
            SELECT name, language_code, country_code, pitch, speed, gain, model_type, folder
            FROM voices
            WHERE name = ?1 AND language_code = ?2 AND country_code = ?3
            "#,
        )
        .bind(&key.name)
        .bind(&key.language_code)
        .bind(&key.country_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(record_from_row))
    }

    /// Number of registered voices.
    pub async fn count_voices(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM voices")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
