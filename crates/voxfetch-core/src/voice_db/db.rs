//! SQLite-backed voice registry: connection, migrations, shared handle.
//!
//! Voice CRUD lives in `voices`.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, OnceCell};

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Default registry location: `~/.local/state/voxfetch/voices.db`.
pub fn default_db_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("voxfetch")?;
    Ok(xdg_dirs.get_state_home().join("voices.db"))
}

static SHARED: OnceCell<VoiceDb> = OnceCell::const_new();

/// Handle to the voice registry. Clones share the pool and the write lock.
#[derive(Clone)]
pub struct VoiceDb {
    pub(crate) pool: Pool<Sqlite>,
    /// Serializes writers so each upsert/delete is applied whole.
    pub(crate) write_lock: Arc<Mutex<()>>,
}

impl VoiceDb {
    fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open (or create) the default registry and run migrations.
    pub async fn open_default() -> Result<Self> {
        Self::open_at(default_db_path()?).await
    }

    /// Open (or create) the registry at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await
            .with_context(|| format!("open voice registry {}", path.display()))?;
        let db = Self::from_pool(pool);
        db.migrate().await?;
        Ok(db)
    }

    /// Process-wide registry at the default path, opened on first use.
    /// Prefer passing a `VoiceDb` explicitly; this is for callers that cannot.
    pub async fn shared() -> Result<VoiceDb> {
        let db = SHARED.get_or_try_init(Self::open_default).await?;
        Ok(db.clone())
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS voices (
                name TEXT NOT NULL,
                language_code TEXT NOT NULL,
                country_code TEXT NOT NULL,
                pitch REAL NOT NULL DEFAULT 0,
                speed REAL NOT NULL DEFAULT 1,
                gain REAL NOT NULL DEFAULT 1,
                model_type TEXT NOT NULL,
                folder TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (name, language_code, country_code)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Current time as Unix seconds (for DB timestamps).
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<VoiceDb> {
    // Single connection: each new in-memory connection would be a fresh empty DB.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = VoiceDb::from_pool(pool);
    db.migrate().await?;
    Ok(db)
}
