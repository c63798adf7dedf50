//! Tests for install and import subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use voxfetch_core::Source;

#[test]
fn cli_parse_install_kokoro() {
    match parse(&["voxfetch", "install", "kokoro", "Kokoro Small (82M) – en-US"]) {
        CliCommand::Install { source, selection } => {
            assert_eq!(source, Source::Kokoro);
            assert_eq!(selection, "Kokoro Small (82M) – en-US");
        }
        _ => panic!("expected Install"),
    }
}

#[test]
fn cli_parse_install_source_case_insensitive() {
    match parse(&["voxfetch", "install", "Piper", "en_US-amy-low"]) {
        CliCommand::Install { source, .. } => assert_eq!(source, Source::Piper),
        _ => panic!("expected Install"),
    }
}

#[test]
fn cli_rejects_unknown_source() {
    assert!(Cli::try_parse_from(["voxfetch", "install", "espeak", "x"]).is_err());
}

#[test]
fn cli_install_requires_selection() {
    assert!(Cli::try_parse_from(["voxfetch", "install", "kokoro"]).is_err());
}

#[test]
fn cli_parse_import() {
    match parse(&["voxfetch", "import", "/tmp/en_US-amy-low.zip"]) {
        CliCommand::Import { path } => {
            assert_eq!(path, std::path::PathBuf::from("/tmp/en_US-amy-low.zip"))
        }
        _ => panic!("expected Import"),
    }
}
