//! CLI command handlers. Each command is in its own file.

mod catalog;
mod checksum;
mod completions;
mod import;
mod install;
mod list;
mod remove;
mod tune;

pub use catalog::run_catalog;
pub use checksum::run_checksum;
pub use completions::{run_completions, run_man};
pub use import::run_import;
pub use install::run_install;
pub use list::run_list;
pub use remove::run_remove;
pub use tune::run_tune;
