//! Process-wide communication runtime.
//!
//! The runtime is live between a successful [`CommsRuntime::init`] and the
//! first [`RuntimeContext::shutdown`]. Shutdown may come from the dependency
//! registry or from any other holder of the runtime, and only the first
//! caller performs the teardown.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use engine::RuntimeContext;
use thiserror::Error;
use tracing::{debug, info};

const UNINITIALIZED: u8 = 0;
const LIVE: u8 = 1;
const SHUT_DOWN: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommsState {
    Uninitialized,
    Live,
    ShutDown,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CommsError {
    #[error("communication runtime is already live")]
    AlreadyLive,
    #[error("communication runtime was shut down and cannot be restarted")]
    AlreadyShutDown,
}

#[derive(Debug, Default)]
pub(crate) struct CommsRuntime {
    state: AtomicU8,
    teardowns: AtomicU32,
}

impl CommsRuntime {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn init(&self, args: &[String]) -> Result<(), CommsError> {
        match self
            .state
            .compare_exchange(UNINITIALIZED, LIVE, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                info!(arg_count = args.len(), "comms_runtime_started");
                Ok(())
            }
            Err(LIVE) => Err(CommsError::AlreadyLive),
            Err(_) => Err(CommsError::AlreadyShutDown),
        }
    }

    pub(crate) fn state(&self) -> CommsState {
        match self.state.load(Ordering::Acquire) {
            UNINITIALIZED => CommsState::Uninitialized,
            LIVE => CommsState::Live,
            _ => CommsState::ShutDown,
        }
    }

    /// Number of teardowns performed. Never exceeds one.
    pub(crate) fn teardowns(&self) -> u32 {
        self.teardowns.load(Ordering::Acquire)
    }
}

impl RuntimeContext for CommsRuntime {
    fn is_live(&self) -> bool {
        self.state() == CommsState::Live
    }

    fn shutdown(&self) -> bool {
        let won = self
            .state
            .compare_exchange(LIVE, SHUT_DOWN, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            let teardowns = self.teardowns.fetch_add(1, Ordering::AcqRel) + 1;
            debug!(teardowns, "comms_runtime_torn_down");
        }
        won
    }
}

/// The runtime shared by the whole process.
pub(crate) fn global() -> Arc<CommsRuntime> {
    static RUNTIME: OnceLock<Arc<CommsRuntime>> = OnceLock::new();
    Arc::clone(RUNTIME.get_or_init(|| Arc::new(CommsRuntime::new())))
}
