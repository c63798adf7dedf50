//! Persistent voice registry (SQLite via sqlx).
//!
//! One row per installed voice, keyed by name, language and country.
//! Writing the same key twice replaces the earlier row.

pub mod types;
pub mod db;
mod voices;


pub use types::*;
pub use db::*;
pub use voices::remove_installed_voice;
