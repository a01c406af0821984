use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;
use tracing::{debug, error, info, warn};

pub type AcquireError = Box<dyn StdError + Send + Sync + 'static>;
pub type AcquireFn = Box<dyn FnMut() -> Result<(), AcquireError>>;
pub type ReleaseFn = Box<dyn FnMut()>;

/// Process-wide state owned outside the game, e.g. a communication runtime.
///
/// Something other than the registry (a signal handler, a remote shutdown)
/// may tear the context down at any time, so release paths must ask before
/// they act.
pub trait RuntimeContext {
    fn is_live(&self) -> bool;
    /// Returns `false` when the context had already been shut down.
    fn shutdown(&self) -> bool;
}

/// Check-then-act release of a [`RuntimeContext`].
///
/// Finding the context already down is an accepted outcome: it is logged and
/// the function returns without touching the context again.
pub fn release_runtime_context(name: &str, context: &dyn RuntimeContext) {
    if !context.is_live() {
        info!(dependency = name, "runtime_context_already_shut_down");
        return;
    }
    if context.shutdown() {
        info!(dependency = name, "runtime_context_shut_down");
    } else {
        error!(
            dependency = name,
            "runtime_context_shutdown_lost_race_already_shut_down"
        );
    }
}

#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("failed to acquire dependency {name}: {source}")]
    AcquireFailed {
        name: String,
        #[source]
        source: AcquireError,
    },
}

pub struct DependencyDescriptor {
    name: String,
    acquire: AcquireFn,
    release: ReleaseFn,
}

impl DependencyDescriptor {
    pub fn new(
        name: impl Into<String>,
        acquire: impl FnMut() -> Result<(), AcquireError> + 'static,
        release: impl FnMut() + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            acquire: Box::new(acquire),
            release: Box::new(release),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for DependencyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyState {
    Registered,
    Acquired,
    Released,
}

#[derive(Debug)]
struct Entry {
    descriptor: DependencyDescriptor,
    state: DependencyState,
}

/// Ordered `(name, acquire, release)` list.
///
/// Acquisition runs in registration order, release in reverse. A release
/// only ever follows a successful acquire and runs at most once. Dropping the
/// registry releases whatever is still acquired.
#[derive(Debug, Default)]
pub struct DependencyRegistry {
    entries: Vec<Entry>,
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: DependencyDescriptor) -> &mut Self {
        debug!(dependency = descriptor.name(), "dependency_registered");
        self.entries.push(Entry {
            descriptor,
            state: DependencyState::Registered,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.descriptor.name())
    }

    pub fn state(&self, name: &str) -> Option<DependencyState> {
        self.entries
            .iter()
            .find(|entry| entry.descriptor.name() == name)
            .map(|entry| entry.state)
    }

    /// Acquires every still-registered dependency in order.
    ///
    /// The first failure releases everything acquired so far, newest first,
    /// and is returned to the caller.
    pub fn acquire_all(&mut self) -> Result<(), DependencyError> {
        for idx in 0..self.entries.len() {
            let entry = &mut self.entries[idx];
            if entry.state != DependencyState::Registered {
                continue;
            }
            match (entry.descriptor.acquire)() {
                Ok(()) => {
                    entry.state = DependencyState::Acquired;
                    info!(dependency = entry.descriptor.name(), "dependency_acquired");
                }
                Err(source) => {
                    let name = entry.descriptor.name().to_string();
                    warn!(dependency = %name, error = %source, "dependency_acquire_failed");
                    self.release_all();
                    return Err(DependencyError::AcquireFailed { name, source });
                }
            }
        }
        Ok(())
    }

    pub fn release_all(&mut self) {
        for entry in self.entries.iter_mut().rev() {
            if entry.state != DependencyState::Acquired {
                continue;
            }
            (entry.descriptor.release)();
            entry.state = DependencyState::Released;
            info!(dependency = entry.descriptor.name(), "dependency_released");
        }
    }
}

impl Drop for DependencyRegistry {
    fn drop(&mut self) {
        self.release_all();
    }
}
