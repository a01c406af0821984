mod config;
mod dependency;
mod game;
mod input;
mod loop_runner;
mod rendering;
mod shutdown;
mod timer;

pub use config::{
    default_engine_config, EngineConfig, WindowBorderMode, WindowConfig, WindowDisplayMode,
};
pub use dependency::{
    release_runtime_context, AcquireError, DependencyDescriptor, DependencyError,
    DependencyRegistry, DependencyState, RuntimeContext,
};
pub use game::{DrawCommand, Frame, Game};
pub use input::{InputAction, InputEvent, KeyState, Point};
pub use loop_runner::{run_app, AppError};
pub use rendering::{Renderer, Viewport};
pub use shutdown::ShutdownSignal;
pub use timer::{allocate_ranges, ranges_are_disjoint, TimerId, TimerIdAllocator, TimerRange};
