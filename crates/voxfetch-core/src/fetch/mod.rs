//! Single-stream HTTP GET into a scratch file.
//!
//! Uses the curl crate (libcurl). Connects with a bounded connect timeout,
//! aborts when the transfer stalls for longer than the read timeout, and
//! streams the body in fixed-size chunks into an `AssetWriter`. Runs in the
//! current thread; the pipeline calls it from `spawn_blocking`.

mod classify;
mod error;

pub use classify::{classify, classify_curl_error};
pub use error::FetchError;

use std::cell::Cell;
use std::str;
use std::time::Duration;

use crate::config::VoxConfig;
use crate::control::CancelToken;
use crate::storage::AssetWriter;

/// Transfer limits for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    /// Abort when fewer than 1 byte/s arrives for this long.
    pub read_timeout: Duration,
    /// libcurl receive buffer size; each write callback gets at most this much.
    pub chunk_size: usize,
    pub max_redirects: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            chunk_size: 8 * 1024,
            max_redirects: 10,
        }
    }
}

impl FetchOptions {
    pub fn from_config(cfg: &VoxConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs.max(1)),
            read_timeout: Duration::from_secs(cfg.read_timeout_secs.max(1)),
            chunk_size: cfg.chunk_size_bytes,
            max_redirects: cfg.max_redirects,
        }
    }
}

/// Blocking HTTP client for voice assets.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchClient {
    opts: FetchOptions,
}

impl FetchClient {
    pub fn new(opts: FetchOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.opts
    }

    /// GET `url`, appending the body to `dest`. `on_progress(bytes_written, total)`
    /// runs after every chunk; `total` is the response `Content-Length` when known.
    /// Returns the number of bytes written. On error the caller drops `dest`,
    /// which removes the partial file.
    pub fn fetch<F>(
        &self,
        url: &str,
        dest: &mut AssetWriter,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> Result<u64, FetchError>
    where
        F: FnMut(u64, Option<u64>),
    {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.opts.max_redirects)?;
        easy.connect_timeout(self.opts.connect_timeout)?;
        easy.low_speed_limit(1)?;
        easy.low_speed_time(self.opts.read_timeout)?;
        easy.buffer_size(self.opts.chunk_size)?;
        easy.progress(true)?;

        let total: Cell<Option<u64>> = Cell::new(None);
        let mut storage_error: Option<std::io::Error> = None;

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(line) = str::from_utf8(data) {
                    // A new status line starts a new header block (redirect hop).
                    if line.starts_with("HTTP/") {
                        total.set(None);
                    } else if let Some(n) = parse_content_length(line) {
                        total.set(Some(n));
                    }
                }
                true
            })?;
            transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
            transfer.write_function(|data| {
                if cancel.is_cancelled() {
                    return Ok(0);
                }
                if let Err(e) = dest.append(data) {
                    storage_error = Some(e);
                    return Ok(0);
                }
                on_progress(dest.bytes_written(), total.get());
                Ok(data.len())
            })?;
            transfer.perform()
        };

        if let Err(e) = perform_result {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            if e.is_write_error() {
                if let Some(io_err) = storage_error {
                    return Err(FetchError::Storage(io_err));
                }
            }
            return Err(FetchError::Curl(e));
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }

        let written = dest.bytes_written();
        tracing::debug!(url, written, "fetch complete");
        Ok(written)
    }
}

/// `Content-Length: N` header line -> N.
fn parse_content_length(line: &str) -> Option<u64> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse().ok()
}
