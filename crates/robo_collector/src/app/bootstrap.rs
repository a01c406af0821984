use std::env;

use engine::{
    resolve_package_share_dir, DependencyError, DependencyRegistry, RuntimeContext,
    ShutdownSignal, StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::comms;
use crate::config::{generate_dependencies, load_application_config, ApplicationConfig, ConfigError};

const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Dependency(#[from] DependencyError),
    #[error("failed to install interrupt handler: {0}")]
    InterruptHandler(#[from] ctrlc::Error),
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) struct AppWiring {
    pub(crate) config: ApplicationConfig,
    pub(crate) dependencies: DependencyRegistry,
    pub(crate) shutdown: ShutdownSignal,
}

/// Acquires the external dependencies, then builds every configuration.
///
/// On error the partially acquired registry is dropped, which releases it.
pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Robo Collector Startup ===");

    let mut dependencies = generate_dependencies(env::args().collect());
    dependencies.acquire_all()?;
    let shutdown = install_interrupt_handler()?;

    let share_dir = resolve_package_share_dir(PACKAGE_NAME)?;
    info!(share_dir = %share_dir.display(), "share_dir_resolved");
    let config = load_application_config(&share_dir)?;

    Ok(AppWiring {
        config,
        dependencies,
        shutdown,
    })
}

/// Ctrl-C stops the communication runtime directly and asks the main loop to
/// exit. The registry release that follows finds the runtime already down.
fn install_interrupt_handler() -> Result<ShutdownSignal, ctrlc::Error> {
    let shutdown = ShutdownSignal::new();
    let handler_shutdown = shutdown.clone();
    let runtime = comms::global();
    ctrlc::set_handler(move || on_interrupt(runtime.as_ref(), &handler_shutdown))?;
    Ok(shutdown)
}

fn on_interrupt(runtime: &dyn RuntimeContext, shutdown: &ShutdownSignal) {
    let stopped = runtime.shutdown();
    if shutdown.request() {
        info!(comms_stopped = stopped, "interrupt_received");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
