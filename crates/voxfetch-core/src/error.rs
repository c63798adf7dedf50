//! Error taxonomy surfaced to install callers.
//!
//! Internal plumbing uses `anyhow`; everything that crosses the pipeline
//! boundary is converted into an `InstallFailure` carrying one `ErrorKind`
//! plus the diagnostic detail (curl text, HTTP status, paths).

use std::fmt;

/// What went wrong, independent of the diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No installer or catalog entry for the requested selection.
    UnknownSelection,
    /// Connect or read stalled past its bound.
    Timeout,
    /// Could not reach the server (refused, DNS, dropped connection).
    ConnectFailure,
    /// Final HTTP response was not 2xx.
    HttpStatus(u32),
    /// Local disk error.
    Io,
    /// Downloaded size differs from the catalog size.
    SizeMismatch,
    /// Downloaded content hash differs from the catalog checksum.
    ChecksumMismatch,
    /// The installer plugin rejected the asset.
    Install,
    /// Cancelled before registration.
    Cancelled,
    /// The voice registry write failed; the registry is unchanged.
    Registry,
}

impl ErrorKind {
    /// Stable snake_case tag for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownSelection => "unknown_selection",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ConnectFailure => "connect_failure",
            ErrorKind::HttpStatus(_) => "http_status",
            ErrorKind::Io => "io",
            ErrorKind::SizeMismatch => "size_mismatch",
            ErrorKind::ChecksumMismatch => "checksum_mismatch",
            ErrorKind::Install => "install",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Registry => "registry",
        }
    }

    /// One fixed sentence per kind, suitable for a notification.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::UnknownSelection => "This voice is not available for download.",
            ErrorKind::Timeout => "The download server stopped responding.",
            ErrorKind::ConnectFailure => "Could not connect to the download server.",
            ErrorKind::HttpStatus(_) => "The download server refused the request.",
            ErrorKind::Io => "Could not write the voice files to storage.",
            ErrorKind::SizeMismatch => "The downloaded file has an unexpected size.",
            ErrorKind::ChecksumMismatch => "The downloaded file is corrupted.",
            ErrorKind::Install => "The downloaded file is not a supported voice.",
            ErrorKind::Cancelled => "The installation was cancelled.",
            ErrorKind::Registry => "Could not save the installed voice.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::HttpStatus(code) => write!(f, "http_status({})", code),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Terminal failure of one install request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct InstallFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl InstallFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_selection(source: impl fmt::Display, key: &str) -> Self {
        Self::new(
            ErrorKind::UnknownSelection,
            format!("unknown {} option: {}", source, key),
        )
    }

    pub fn install(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Install, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "cancelled by caller")
    }

    pub fn registry(err: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Registry, format!("{:#}", err))
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

impl From<std::io::Error> for InstallFailure {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
