//! Voice write operations: upsert, parameter update, remove.

use anyhow::Result;

use super::super::db::{unix_timestamp, VoiceDb};
use super::super::types::{VoiceKey, VoiceParams, VoiceRecord};

impl VoiceDb {
    /// Insert or replace the voice with this record's key in one statement.
    /// Re-adding an installed voice keeps its `created_at`.
    pub async fn add_voice(&self, record: &VoiceRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let now = unix_timestamp();
        let folder = record
            .folder
            .as_deref()
            .map(|p| p.to_string_lossy().into_owned());

        sqlx::query(
            r#"
            INSERT INTO voices (
                name, language_code, country_code,
                pitch, speed, gain, model_type, folder,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            ON CONFLICT (name, language_code, country_code) DO UPDATE SET
                pitch = excluded.pitch,
                speed = excluded.speed,
                gain = excluded.gain,
                model_type = excluded.model_type,
                folder = excluded.folder,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.name)
        .bind(&record.language_code)
        .bind(&record.country_code)
        .bind(record.pitch as f64)
        .bind(record.speed as f64)
        .bind(record.gain as f64)
        .bind(&record.model_type)
        .bind(folder)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(voice = %record.key(), model_type = %record.model_type, "voice registered");
        Ok(())
    }

    /// Change pitch/speed/gain of an installed voice. Returns false if the voice is unknown.
    pub async fn update_params(&self, key: &VoiceKey, params: VoiceParams) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let now = unix_timestamp();
        let res = sqlx::query(
            r#"
            UPDATE voices
            SET pitch = ?1,
                speed = ?2,
                gain = ?3,
                updated_at = ?4
            WHERE name = ?5 AND language_code = ?6 AND country_code = ?7
            "#,
        )
        .bind(params.pitch as f64)
        .bind(params.speed as f64)
        .bind(params.gain as f64)
        .bind(now)
        .bind(&key.name)
        .bind(&key.language_code)
        .bind(&key.country_code)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    /// Delete a voice row and return it. File cleanup is `remove_installed_voice`.
    pub async fn remove_voice(&self, key: &VoiceKey) -> Result<Option<VoiceRecord>> {
        let _guard = self.write_lock.lock().await;
        let Some(record) = self.get_voice(key).await? else {
            return Ok(None);
        };
        sqlx::query(
            r#"
            DELETE FROM voices
            WHERE name = ?1 AND language_code = ?2 AND country_code = ?3
            "#,
        )
        .bind(&key.name)
        .bind(&key.language_code)
        .bind(&key.country_code)
        .execute(&self.pool)
        .await?;

        Ok(Some(record))
    }
}
