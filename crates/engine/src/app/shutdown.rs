use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cross-thread request for the main loop to exit.
///
/// Clones share one flag. The loop checks it once per iteration, so a request
/// from a signal handler thread ends the loop through the normal exit path.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` for the first request only.
    pub fn request(&self) -> bool {
        !self.requested.swap(true, Ordering::AcqRel)
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
