//! Voice CRUD on `VoiceDb`, plus removal of a voice's files.

mod read;
mod write;

use anyhow::{Context, Result};

use super::db::VoiceDb;
use super::types::{VoiceKey, VoiceRecord};
use crate::storage::StorageLayout;

/// Remove a voice from the registry and delete its folder.
///
/// The folder is only deleted when it lies inside the voices root.
/// Returns the removed record, or `None` if no voice had this key.
pub async fn remove_installed_voice(
    db: &VoiceDb,
    layout: &StorageLayout,
    key: &VoiceKey,
) -> Result<Option<VoiceRecord>> {
    let Some(record) = db.remove_voice(key).await? else {
        return Ok(None);
    };
    if let Some(folder) = record.folder.as_deref() {
        if !layout.contains(folder) {
            tracing::warn!(
                folder = %folder.display(),
                "voice folder outside voices root; leaving files in place"
            );
        } else if tokio::fs::try_exists(folder).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(folder)
                .await
                .with_context(|| format!("delete voice folder {}", folder.display()))?;
            tracing::info!(voice = %key, folder = %folder.display(), "deleted voice files");
        }
    }
    Ok(Some(record))
}
