//! `voxfetch catalog [source]` – list downloadable selections.

use voxfetch_core::config::VoxConfig;
use voxfetch_core::Source;

pub fn run_catalog(cfg: &VoxConfig, source: Option<Source>) {
    let catalog = cfg.catalog();
    let sources: Vec<Source> = match source {
        Some(s) => vec![s],
        None => Source::ALL.to_vec(),
    };
    for source in sources {
        let entries = catalog.entries(source);
        println!("{} ({} available)", source, entries.len());
        for (key, entry) in entries {
            let size = entry
                .size_bytes
                .map(|s| format!("{:.1} MiB", s as f64 / (1024.0 * 1024.0)))
                .unwrap_or_else(|| "-".to_string());
            println!("  {:<36} {:>10}  {}", key, size, entry.url);
        }
    }
}
