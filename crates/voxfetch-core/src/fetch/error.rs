//! Fetch error type, classified into `ErrorKind` before leaving the client.

use std::fmt;

/// Error returned by a single asset download.
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// Final HTTP response had a non-2xx status.
    Http(u32),
    /// Writing the temp file failed (disk full, permission denied).
    Storage(std::io::Error),
    /// The cancel token was set during the transfer.
    Cancelled,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::Storage(e) => write!(f, "storage: {}", e),
            FetchError::Cancelled => f.write_str("transfer cancelled"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Storage(e) => Some(e),
            FetchError::Http(_) | FetchError::Cancelled => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}
