use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod resources;

pub use app::{
    allocate_ranges, default_engine_config, ranges_are_disjoint, release_runtime_context, run_app,
    AcquireError, AppError, DependencyDescriptor, DependencyError, DependencyRegistry,
    DependencyState, DrawCommand, EngineConfig, Frame, Game, InputAction, InputEvent, KeyState,
    Point, Renderer, RuntimeContext, ShutdownSignal, TimerId, TimerIdAllocator, TimerRange, Viewport,
    WindowBorderMode, WindowConfig, WindowDisplayMode,
};
pub use resources::{
    ResourceDesc, ResourceKeyError, ResourceKind, ResourceTable, ResourceTableError, RsrcId,
    RESOURCES_FOLDER_NAME,
};

/// Overrides the install prefix under which `<package>/resources` lives.
pub const SHARE_PREFIX_ENV_VAR: &str = "ROBO_SHARE_PREFIX";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "{env_var} is set but {path} is not a share directory of package '{package}'\n\
A share directory must contain a resources/ folder."
    )]
    InvalidEnvPrefix {
        env_var: &'static str,
        package: String,
        path: PathBuf,
    },
    #[error(
        "Could not find the share directory of package '{package}' by walking upward from {start_dir}\n\
Expected <dir>/share/{package}/resources or <dir>/crates/{package}/resources.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/usr/local/share\""
    )]
    ShareDirNotFound {
        package: String,
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

/// Resolves the read-only install directory of `package`.
pub fn resolve_package_share_dir(package: &str) -> Result<PathBuf, StartupError> {
    match env::var(SHARE_PREFIX_ENV_VAR) {
        Ok(value) => {
            let candidate = normalize_path(&PathBuf::from(value).join(package));
            if is_share_dir(&candidate) {
                Ok(candidate)
            } else {
                Err(StartupError::InvalidEnvPrefix {
                    env_var: SHARE_PREFIX_ENV_VAR,
                    package: package.to_string(),
                    path: candidate,
                })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            find_share_dir_upward(&exe_dir, package).ok_or_else(|| {
                StartupError::ShareDirNotFound {
                    package: package.to_string(),
                    start_dir: normalize_path(&exe_dir),
                    env_var: SHARE_PREFIX_ENV_VAR,
                }
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: SHARE_PREFIX_ENV_VAR,
            source,
        }),
    }
}

fn find_share_dir_upward(start_dir: &Path, package: &str) -> Option<PathBuf> {
    for ancestor in start_dir.ancestors() {
        for layout in ["share", "crates"] {
            let candidate = ancestor.join(layout).join(package);
            if is_share_dir(&candidate) {
                return Some(normalize_path(&candidate));
            }
        }
    }
    None
}

fn is_share_dir(path: &Path) -> bool {
    path.join(RESOURCES_FOLDER_NAME).is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
