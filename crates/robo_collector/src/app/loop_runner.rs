use std::process::ExitCode;

use engine::run_app;
use tracing::error;

use super::bootstrap::AppWiring;
use crate::gui::RoboCollectorGui;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        dependencies,
        shutdown,
    } = app;
    if let Err(err) = run_app(
        config.engine_cfg,
        RoboCollectorGui::default(),
        config.game_cfg,
        dependencies,
        shutdown,
    ) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
