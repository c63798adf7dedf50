//! Asset pipeline: resolve -> fetch -> verify -> install -> register.
//!
//! Each `install` call either joins the run already in flight for its key or
//! starts a new one on a tokio task. Network and disk work runs on the
//! blocking pool; callers only await the handle.

mod events;
mod handle;
mod run;
mod state;

pub use events::InstallEvent;
pub use handle::InstallHandle;
pub use state::{InvalidTransition, Stage};

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::VoxConfig;
use crate::control::CancelToken;
use crate::error::{ErrorKind, InstallFailure};
use crate::fetch::{FetchClient, FetchOptions};
use crate::installer::{self, InstallerRegistry};
use crate::request::{InstallKey, InstallRequest};
use crate::storage::StorageLayout;
use crate::voice_db::{VoiceDb, VoiceRecord};
use events::{Reporter, Subscription};
use run::Run;

struct InFlight {
    cancel: CancelToken,
    sub: Subscription,
}

pub(crate) struct Inner {
    registry: InstallerRegistry,
    db: VoiceDb,
    layout: StorageLayout,
    client: FetchClient,
    in_flight: Mutex<HashMap<InstallKey, InFlight>>,
}

impl Inner {
    fn runs(&self) -> MutexGuard<'_, HashMap<InstallKey, InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cheap to clone; clones share in-flight runs.
#[derive(Clone)]
pub struct AssetPipeline {
    inner: Arc<Inner>,
}

impl AssetPipeline {
    pub fn new(
        registry: InstallerRegistry,
        db: VoiceDb,
        layout: StorageLayout,
        client: FetchClient,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                db,
                layout,
                client,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Pipeline over the configured voices root, catalog and timeouts.
    pub fn from_config(cfg: &VoxConfig, db: VoiceDb) -> Result<Self> {
        let layout = StorageLayout::open(cfg.voices_root()?)?;
        let registry = InstallerRegistry::from_catalog(&cfg.catalog());
        let client = FetchClient::new(FetchOptions::from_config(cfg));
        Ok(Self::new(registry, db, layout, client))
    }

    pub fn registry(&self) -> &InstallerRegistry {
        &self.inner.registry
    }

    pub fn db(&self) -> &VoiceDb {
        &self.inner.db
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.inner.layout
    }

    /// Number of runs currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.runs().len()
    }

    /// Start (or join) the install of `req`. Must be called within a Tokio runtime.
    ///
    /// Resolution happens before this returns: an unknown selection yields a
    /// handle that has already failed with `UnknownSelection`, without any I/O.
    pub fn install(&self, req: InstallRequest) -> InstallHandle {
        let mut runs = self.inner.runs();
        if let Some(run) = runs.get(&req) {
            tracing::debug!(key = %req, "joining in-flight install");
            return InstallHandle::new(req, true, run.cancel.clone(), &run.sub);
        }

        let (reporter, sub) = Reporter::new();
        let cancel = CancelToken::new();
        let handle = InstallHandle::new(req.clone(), false, cancel.clone(), &sub);
        reporter.advance(Stage::Resolving);

        let (installer, spec) = match self.inner.registry.resolve(&req) {
            Ok(found) => found,
            Err(failure) => {
                tracing::warn!(key = %req, "{}", failure);
                reporter.finish(Err(failure));
                return handle;
            }
        };

        tracing::info!(key = %req, url = %spec.url, "install started");
        runs.insert(
            req.clone(),
            InFlight {
                cancel: cancel.clone(),
                sub,
            },
        );
        drop(runs);

        let reporter = Arc::new(reporter);
        let run = Run {
            inner: Arc::clone(&self.inner),
            key: req.clone(),
            installer,
            spec,
            cancel,
            reporter: Arc::clone(&reporter),
        };
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = match tokio::spawn(run.execute()).await {
                Ok(outcome) => outcome,
                Err(e) => Err(InstallFailure::new(
                    ErrorKind::Io,
                    format!("install task failed: {}", e),
                )),
            };
            // Release the key first so a caller woken by the outcome starts a fresh run.
            inner.runs().remove(&req);
            match &outcome {
                Ok(record) => tracing::info!(key = %req, voice = %record.key(), "install done"),
                Err(failure) => tracing::warn!(key = %req, "install failed: {}", failure),
            }
            reporter.finish(outcome);
        });

        handle
    }

    /// Install a voice from a local zip archive, `.onnx` file or directory.
    pub async fn import_local(&self, path: impl AsRef<Path>) -> Result<VoiceRecord, InstallFailure> {
        let path = path.as_ref().to_path_buf();
        let layout = self.inner.layout.clone();
        let record = tokio::task::spawn_blocking(move || installer::install_local(&path, &layout))
            .await
            .map_err(|e| InstallFailure::new(ErrorKind::Io, format!("import task failed: {}", e)))??;
        self.inner
            .db
            .add_voice(&record)
            .await
            .map_err(InstallFailure::registry)?;
        tracing::info!(voice = %record.key(), model_type = %record.model_type, "voice imported");
        Ok(record)
    }
}
