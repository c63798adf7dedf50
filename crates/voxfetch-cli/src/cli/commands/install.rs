//! `voxfetch install <source> <selection>` – fetch, verify and install one voice.

use anyhow::{anyhow, Result};
use std::io::Write;
use std::time::Instant;
use tokio::sync::broadcast::{self, error::RecvError};
use voxfetch_core::config::VoxConfig;
use voxfetch_core::voice_db::VoiceDb;
use voxfetch_core::{AssetPipeline, InstallEvent, InstallRequest, Source};

const PROGRESS_INTERVAL_MS: u128 = 500;

fn mib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Print stage changes and throttled progress until the run's event stream closes.
async fn print_events(mut events: broadcast::Receiver<InstallEvent>) {
    let mut last_print: Option<Instant> = None;
    loop {
        match events.recv().await {
            Ok(InstallEvent::Stage(stage)) => {
                if last_print.is_some() {
                    eprintln!();
                    last_print = None;
                }
                tracing::debug!(%stage, "stage");
                eprintln!("{}...", stage);
            }
            Ok(InstallEvent::Progress {
                bytes_written,
                total_bytes,
            }) => {
                let due = last_print
                    .map(|t| t.elapsed().as_millis() >= PROGRESS_INTERVAL_MS)
                    .unwrap_or(true);
                if !due {
                    continue;
                }
                match total_bytes {
                    Some(total) if total > 0 => eprint!(
                        "\r  {:.1} / {:.1} MiB ({:.0}%)",
                        mib(bytes_written),
                        mib(total),
                        bytes_written as f64 * 100.0 / total as f64
                    ),
                    _ => eprint!("\r  {:.1} MiB", mib(bytes_written)),
                }
                let _ = std::io::stderr().flush();
                last_print = Some(Instant::now());
            }
            Ok(InstallEvent::Succeeded(_)) | Ok(InstallEvent::Failed(_)) => {}
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

pub async fn run_install(cfg: &VoxConfig, db: VoiceDb, source: Source, selection: &str) -> Result<()> {
    let pipeline = AssetPipeline::from_config(cfg, db)?;
    let mut handle = pipeline.install(InstallRequest::new(source, selection));
    let printer = tokio::spawn(print_events(handle.events()));

    let cancel = handle.cancel_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ncancelling...");
            cancel.cancel();
        }
    });

    let outcome = handle.wait().await;
    ctrl_c.abort();
    let _ = printer.await;

    let record = outcome.map_err(|f| anyhow!("{} ({})", f.user_message(), f))?;
    match &record.folder {
        Some(dir) => println!(
            "Installed {} ({}_{}) into {}",
            record.name,
            record.language_code,
            record.country_code,
            dir.display()
        ),
        None => println!(
            "Installed {} ({}_{})",
            record.name, record.language_code, record.country_code
        ),
    }
    Ok(())
}
