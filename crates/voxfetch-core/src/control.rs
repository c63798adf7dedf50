//! Cooperative cancellation for install runs.
//!
//! Each run owns one `CancelToken`; every handle attached to the run holds a
//! clone. The fetch loop checks the token between chunks and the pipeline
//! checks it at each stage boundary up to (not including) registration.
//! A cancel seen after Installing rolls the freshly installed files back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
