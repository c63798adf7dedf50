//! CLI for the voxfetch voice installer.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use voxfetch_core::config;
use voxfetch_core::voice_db::VoiceDb;
use voxfetch_core::Source;

use commands::{
    run_catalog, run_checksum, run_completions, run_import, run_install, run_list, run_man,
    run_remove, run_tune,
};

/// Top-level CLI for voxfetch.
#[derive(Debug, Parser)]
#[command(name = "voxfetch")]
#[command(about = "voxfetch: download, verify and install speech-synthesis voices", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download and install a voice from the catalog.
    Install {
        /// Voice source: piper, coqui or kokoro.
        source: Source,
        /// Selection key as listed by `voxfetch catalog`.
        selection: String,
    },

    /// Install a voice from a local zip archive, .onnx file or directory.
    Import {
        path: PathBuf,
    },

    /// List installed voices.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show downloadable selections, for one source or all.
    Catalog {
        source: Option<Source>,
    },

    /// Remove an installed voice and its files.
    Remove {
        name: String,
        /// Language code, e.g. "en".
        lang: String,
        /// Country code, e.g. "US".
        country: String,
        /// Only remove the registry entry; leave the voice folder on disk.
        #[arg(long)]
        keep_files: bool,
    },

    /// Change pitch, speed or gain of an installed voice.
    Tune {
        name: String,
        lang: String,
        country: String,
        #[arg(long)]
        pitch: Option<f32>,
        #[arg(long)]
        speed: Option<f32>,
        #[arg(long)]
        gain: Option<f32>,
    },

    /// Compute SHA-256 of a file (e.g. to fill a catalog entry).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        cli.command.run().await
    }

    async fn run(self) -> Result<()> {
        // Commands that need neither config nor registry.
        match &self {
            CliCommand::Checksum { path } => return run_checksum(path).await,
            CliCommand::Completions { shell } => return run_completions(*shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let db = VoiceDb::open_default().await?;

        match self {
            CliCommand::Install { source, selection } => {
                run_install(&cfg, db, source, &selection).await?
            }
            CliCommand::Import { path } => run_import(&cfg, db, &path).await?,
            CliCommand::List { json } => run_list(&db, json).await?,
            CliCommand::Catalog { source } => run_catalog(&cfg, source),
            CliCommand::Remove {
                name,
                lang,
                country,
                keep_files,
            } => run_remove(&cfg, &db, &name, &lang, &country, keep_files).await?,
            CliCommand::Tune {
                name,
                lang,
                country,
                pitch,
                speed,
                gain,
            } => run_tune(&db, &name, &lang, &country, pitch, speed, gain).await?,
            CliCommand::Checksum { .. } | CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
