//! One install run: fetch, verify, install, register.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempPath;

use super::events::{Outcome, Reporter};
use super::state::Stage;
use super::Inner;
use crate::control::CancelToken;
use crate::error::{ErrorKind, InstallFailure};
use crate::installer::{InstallContext, Installer};
use crate::request::{FetchSpec, InstallKey};
use crate::verify;
use crate::voice_db::VoiceRecord;

pub(crate) struct Run {
    pub(crate) inner: Arc<Inner>,
    pub(crate) key: InstallKey,
    pub(crate) installer: Arc<dyn Installer>,
    pub(crate) spec: FetchSpec,
    pub(crate) cancel: CancelToken,
    pub(crate) reporter: Arc<Reporter>,
}

fn blocking_failure(e: tokio::task::JoinError) -> InstallFailure {
    InstallFailure::new(ErrorKind::Io, format!("blocking task failed: {}", e))
}

impl Run {
    fn check_cancel(&self) -> Result<(), InstallFailure> {
        if self.cancel.is_cancelled() {
            return Err(InstallFailure::cancelled());
        }
        Ok(())
    }

    /// Run every stage up to and including Registering. Cancellation is
    /// honoured until Registering begins. The terminal stage is published by
    /// the caller once the key has been released.
    pub(crate) async fn execute(self) -> Outcome {
        self.reporter.advance(Stage::Fetching);
        self.check_cancel()?;
        let (asset, bytes) = self.fetch().await?;
        tracing::info!(key = %self.key, bytes, "asset downloaded");

        self.reporter.advance(Stage::Verifying);
        self.check_cancel()?;
        let path: PathBuf = asset.to_path_buf();
        let spec = self.spec.clone();
        tokio::task::spawn_blocking(move || verify::verify(&path, &spec))
            .await
            .map_err(blocking_failure)??;

        self.reporter.advance(Stage::Installing);
        self.check_cancel()?;
        let installer = Arc::clone(&self.installer);
        let ctx = InstallContext {
            selection_key: self.key.selection_key.clone(),
            layout: self.inner.layout.clone(),
        };
        let record = tokio::task::spawn_blocking(move || {
            let res = installer.install(&asset, &ctx);
            // The scratch asset is gone once Installing ends, whatever the result.
            drop(asset);
            res
        })
        .await
        .map_err(blocking_failure)??;

        if self.cancel.is_cancelled() {
            self.discard_installed(&record).await;
            return Err(InstallFailure::cancelled());
        }

        self.reporter.advance(Stage::Registering);
        self.inner
            .db
            .add_voice(&record)
            .await
            .map_err(InstallFailure::registry)?;
        Ok(record)
    }

    /// Undo the files of a run cancelled during Installing. A folder that an
    /// already registered voice points at stays, so that entry remains usable.
    async fn discard_installed(&self, record: &VoiceRecord) {
        let Some(folder) = record.folder.as_deref() else {
            return;
        };
        match self.inner.db.get_voice(&record.key()).await {
            Ok(Some(existing)) if existing.folder.as_deref() == Some(folder) => return,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(key = %self.key, "registry lookup after cancel: {:#}", e);
                return;
            }
        }
        if !self.inner.layout.contains(folder) {
            return;
        }
        match tokio::fs::remove_dir_all(folder).await {
            Ok(()) => tracing::info!(key = %self.key, folder = %folder.display(), "removed files of cancelled install"),
            Err(e) => tracing::warn!(folder = %folder.display(), "remove cancelled install: {}", e),
        }
    }

    /// Stream the asset into a fresh scratch file on the blocking pool.
    async fn fetch(&self) -> Result<(TempPath, u64), InstallFailure> {
        let mut writer = self
            .inner
            .layout
            .new_asset()
            .map_err(|e| InstallFailure::io(format!("{:#}", e)))?;
        let client = self.inner.client;
        let url = self.spec.url.clone();
        let cancel = self.cancel.clone();
        let reporter = Arc::clone(&self.reporter);

        tokio::task::spawn_blocking(move || {
            let n = client.fetch(&url, &mut writer, &cancel, |written, total| {
                reporter.progress(written, total)
            })?;
            writer
                .sync()
                .map_err(|e| InstallFailure::io(format!("{:#}", e)))?;
            Ok::<_, InstallFailure>((writer.into_temp_path(), n))
        })
        .await
        .map_err(blocking_failure)?
    }
}
