use std::error::Error as StdError;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use image::ImageReader;
use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Fullscreen, Icon, WindowBuilder};

use crate::resources::{ResourceTable, ResourceTableError};

use super::dependency::{DependencyError, DependencyRegistry};
use super::input::action_from_physical_key;
use super::shutdown::ShutdownSignal;
use super::{
    EngineConfig, Frame, Game, InputAction, InputEvent, KeyState, Point, Renderer,
    WindowBorderMode, WindowConfig, WindowDisplayMode,
};

const OVERLAY_POS: Point = Point::new(8, 8);

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Dependency(#[from] DependencyError),
    #[error("invalid resource table: {0}")]
    Resources(#[from] ResourceTableError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("game initialization failed: {0}")]
    GameInit(#[source] Box<dyn StdError + Send + Sync + 'static>),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Runs `game` until the window closes or `shutdown` is requested.
///
/// Dependencies not yet acquired are acquired first. They are released after
/// `Game::deinit` when the loop exits, or when the registry is dropped on an
/// early error return.
pub fn run_app<G>(
    config: EngineConfig,
    mut game: G,
    game_cfg: G::Config,
    mut dependencies: DependencyRegistry,
    shutdown: ShutdownSignal,
) -> Result<(), AppError>
where
    G: Game + 'static,
{
    dependencies.acquire_all()?;
    let resources = ResourceTable::new(&config.resources)?;
    info!(
        window = %config.window.name,
        width = config.window.width,
        height = config.window.height,
        resources_dir = %config.resources_dir.display(),
        resource_count = resources.len(),
        dependency_count = dependencies.len(),
        "startup"
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        window_builder(&config.window)
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window), config.resources_dir.clone(), resources)
        .map_err(AppError::CreateRenderer)?;

    game.init(game_cfg)
        .map_err(|error| AppError::GameInit(Box::new(error)))?;
    info!("game_initialized");

    event_loop.set_control_flow(ControlFlow::Poll);

    let render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(render_cap);
    let max_frame_delta = config.max_frame_delta;
    let debug_console_rsrc_id = config.debug_console_rsrc_id;
    let mut overlay_visible = config.overlay_visible;
    let mut frame = Frame::new();
    let mut cursor = Point::default();
    let mut last_present_instant = Instant::now();
    let mut last_frame_dt = Duration::ZERO;
    info!(
        render_fps_cap = %format_render_cap(render_cap),
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        overlay_visible,
        "loop_config"
    );

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    cursor = Point::new(position.x as i32, position.y as i32);
                    game.handle_event(&InputEvent::CursorMoved { pos: cursor });
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => {
                    game.handle_event(&InputEvent::MouseButton {
                        pos: cursor,
                        state: key_state(state),
                    });
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.repeat {
                        return;
                    }
                    let Some(action) = action_from_physical_key(event.physical_key) else {
                        return;
                    };
                    let state = key_state(event.state);
                    match (action, state) {
                        (InputAction::Quit, KeyState::Pressed) => {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                        (InputAction::ToggleOverlay, KeyState::Pressed) => {
                            overlay_visible = !overlay_visible;
                            info!(overlay_visible, "overlay_toggled");
                        }
                        (InputAction::Quit | InputAction::ToggleOverlay, KeyState::Released) => {}
                        _ => game.handle_event(&InputEvent::Key { action, state }),
                    }
                }
                WindowEvent::RedrawRequested => {
                    // Single FPS cap sleep point for render pacing.
                    let elapsed = Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep = compute_cap_sleep(elapsed, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    frame.clear();
                    game.draw(&mut frame);
                    if overlay_visible {
                        if let Some(font_id) = debug_console_rsrc_id {
                            let text = overlay_text(last_frame_dt, frame.len());
                            frame.draw_text(font_id, text, OVERLAY_POS);
                        }
                    }
                    if let Err(error) = renderer.render_frame(&frame) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }

                    let now = Instant::now();
                    last_frame_dt = clamp_frame_delta(
                        now.saturating_duration_since(last_present_instant),
                        max_frame_delta,
                    );
                    last_present_instant = now;
                }
                _ => {}
            },
            Event::AboutToWait => {
                if shutdown.is_requested() {
                    info!(reason = "interrupt", "shutdown_requested");
                    window_target.exit();
                } else {
                    window.request_redraw();
                }
            }
            Event::LoopExiting => {
                game.deinit();
                dependencies.release_all();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn window_builder(cfg: &WindowConfig) -> WindowBuilder {
    let mut builder = WindowBuilder::new()
        .with_title(cfg.name.clone())
        .with_inner_size(LogicalSize::new(cfg.width as f64, cfg.height as f64))
        .with_decorations(has_decorations(cfg.border_mode))
        .with_fullscreen(fullscreen_for(cfg.display_mode));
    if let Some(pos) = cfg.pos {
        builder = builder.with_position(LogicalPosition::new(pos.x as f64, pos.y as f64));
    }
    if let Some(icon_path) = &cfg.icon_path {
        builder = builder.with_window_icon(load_window_icon(icon_path));
    }
    builder
}

fn has_decorations(border_mode: WindowBorderMode) -> bool {
    border_mode == WindowBorderMode::Bordered
}

fn fullscreen_for(display_mode: WindowDisplayMode) -> Option<Fullscreen> {
    match display_mode {
        WindowDisplayMode::Windowed => None,
        WindowDisplayMode::FullScreen => Some(Fullscreen::Borderless(None)),
    }
}

fn load_window_icon(path: &Path) -> Option<Icon> {
    let decoded = ImageReader::open(path)
        .map_err(|error| error.to_string())
        .and_then(|reader| reader.decode().map_err(|error| error.to_string()));
    let image = match decoded {
        Ok(image) => image.to_rgba8(),
        Err(reason) => {
            warn!(path = %path.display(), reason = %reason, "window_icon_load_failed");
            return None;
        }
    };
    let (width, height) = image.dimensions();
    match Icon::from_rgba(image.into_raw(), width, height) {
        Ok(icon) => Some(icon),
        Err(error) => {
            warn!(path = %path.display(), error = %error, "window_icon_invalid");
            None
        }
    }
}

fn key_state(state: ElementState) -> KeyState {
    match state {
        ElementState::Pressed => KeyState::Pressed,
        ElementState::Released => KeyState::Released,
    }
}

fn overlay_text(frame_dt: Duration, draw_command_count: usize) -> String {
    format!(
        "frame {:.1}ms draws {}",
        frame_dt.as_secs_f64() * 1000.0,
        draw_command_count
    )
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}
