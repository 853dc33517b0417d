use std::env;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::content::{compile_content, ContentCompileError};
use crate::geometry::Vec2;
use crate::AppPaths;

use super::input::{ActionStates, PressEdge};
use super::metrics::MetricsAccumulator;
use super::rendering::{DrawList, Renderer};
use super::scene::{SceneMachine, DEFAULT_CANVAS};
use super::{InputAction, InputSnapshot, MetricsHandle, Scene, SceneKey};

pub const SLOW_FRAME_ENV_VAR: &str = "AIRPORT_SLOW_FRAME_MS";

const DIGIT_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Airport Run".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("failed to compile content: {0}")]
    Content(#[from] ContentCompileError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    paths: &AppPaths,
    scene_a: Box<dyn Scene>,
    scene_b: Box<dyn Scene>,
) -> Result<(), AppError> {
    let metrics_handle = MetricsHandle::default();
    run_app_with_metrics(config, paths, scene_a, scene_b, metrics_handle)
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    paths: &AppPaths,
    scene_a: Box<dyn Scene>,
    scene_b: Box<dyn Scene>,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    info!(
        root = %paths.root.display(),
        base_content_dir = %paths.base_content_dir.display(),
        "startup"
    );
    let content = compile_content(paths)?;
    info!(
        zones = content.layout.zones.len(),
        counters = content.layout.counters.len(),
        shops = content.layout.shops.len(),
        gates = content.layout.gates.len(),
        npcs = content.layout.npcs.len(),
        story_scenes = content.story.scenes.len(),
        "content_compiled"
    );
    let mut scenes = SceneMachine::new(scene_a, scene_b, SceneKey::A, content);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window: &'static Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(config.window_width),
                f64::from(config.window_height),
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    ));
    let mut renderer = Renderer::new(window).map_err(AppError::CreateRenderer)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let settings = LoopSettings::resolve(&config, env::var(SLOW_FRAME_ENV_VAR));
    settings.log();
    let window_size = window.inner_size();
    let mut input_collector = InputCollector::new(window_size.width, window_size.height);
    scenes.load_active();
    info!(scene = ?scenes.active_scene(), "scene_loaded");

    let mut pacer = FramePacer::new(&settings, Instant::now());
    let mut metrics_accumulator =
        MetricsAccumulator::new(settings.metrics_log_interval, Instant::now());
    let mut title = WindowTitle::new(config.window_title.clone());
    let mut overlay_visible = false;
    let mut draw_list = DrawList::new(DEFAULT_CANVAS);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(size) => {
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => input_collector.clear_cursor_position(),
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    if input_collector.take_overlay_toggle_pressed() {
                        overlay_visible = !overlay_visible;
                        info!(overlay_visible, "overlay_toggled");
                    }
                    if settings.slow_frame_delay > Duration::ZERO {
                        thread::sleep(settings.slow_frame_delay);
                    }

                    let now = Instant::now();
                    let frame = pacer.begin_frame(now);
                    for _ in 0..frame.plan.ticks_to_run {
                        let snapshot = input_collector.snapshot_for_tick();
                        let command = scenes.update_active(pacer.fixed_dt_seconds(), &snapshot);
                        if scenes.apply_command(command) {
                            info!(scene = ?scenes.active_scene(), ?command, "scene_switched");
                        }
                        metrics_accumulator.record_tick();
                    }
                    if frame.plan.dropped_backlog > Duration::ZERO {
                        let dropped_ticks = pacer.ticks_in(frame.plan.dropped_backlog);
                        metrics_accumulator.record_dropped_ticks(dropped_ticks);
                        warn!(
                            dropped_backlog_ms = frame.plan.dropped_backlog.as_millis() as u64,
                            dropped_ticks,
                            max_ticks_per_frame = settings.max_ticks_per_frame,
                            "sim_clamp_triggered"
                        );
                    }

                    let cap_sleep = pacer.render_cap_sleep(Instant::now());
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }
                    scenes.render_active(&mut draw_list);
                    let overlay_lines =
                        overlay_visible.then(|| metrics_handle.snapshot().overlay_lines());
                    if let Err(error) = renderer.render(&draw_list, overlay_lines.as_deref()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    pacer.mark_presented(Instant::now());
                    title.apply(window, scenes.debug_title_active());

                    metrics_accumulator.record_frame(frame.raw_dt);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            dropped_ticks = snapshot.dropped_ticks,
                            scene = ?scenes.active_scene(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            Event::LoopExiting => {
                scenes.shutdown_all();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// `LoopConfig` with zero and out-of-range values replaced by usable ones.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LoopSettings {
    target_tps: u32,
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    metrics_log_interval: Duration,
    slow_frame_delay: Duration,
    render_frame_target: Option<Duration>,
}

impl LoopSettings {
    fn resolve(config: &LoopConfig, slow_frame_env: Result<String, env::VarError>) -> Self {
        let defaults = LoopConfig::default();
        let non_zero = |value: Duration, fallback: Duration| {
            if value.is_zero() {
                fallback
            } else {
                value
            }
        };
        let target_tps = config.target_tps.max(1);
        Self {
            target_tps,
            fixed_dt: Duration::from_secs_f64(1.0 / f64::from(target_tps)),
            max_frame_delta: non_zero(config.max_frame_delta, defaults.max_frame_delta),
            max_ticks_per_frame: config.max_ticks_per_frame.max(1),
            metrics_log_interval: non_zero(
                config.metrics_log_interval,
                defaults.metrics_log_interval,
            ),
            slow_frame_delay: parse_slow_frame_delay(
                slow_frame_env,
                config.simulated_slow_frame_ms,
            ),
            render_frame_target: config
                .max_render_fps
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps))),
        }
    }

    fn log(&self) {
        let render_fps_cap = match self.render_frame_target {
            Some(target) => format!("{:.0}", 1.0 / target.as_secs_f64()),
            None => "off".to_string(),
        };
        info!(
            target_tps = self.target_tps,
            max_frame_delta_ms = self.max_frame_delta.as_millis() as u64,
            max_ticks_per_frame = self.max_ticks_per_frame,
            metrics_log_interval_ms = self.metrics_log_interval.as_millis() as u64,
            slow_frame_delay_ms = self.slow_frame_delay.as_millis() as u64,
            render_fps_cap = %render_fps_cap,
            "loop_config"
        );
    }
}

#[derive(Debug, Clone, Copy)]
struct FrameStart {
    raw_dt: Duration,
    plan: StepPlan,
}

/// Fixed-timestep accumulator plus the optional present-rate cap.
#[derive(Debug)]
struct FramePacer {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    render_frame_target: Option<Duration>,
    accumulator: Duration,
    last_frame: Instant,
    last_present: Instant,
}

impl FramePacer {
    fn new(settings: &LoopSettings, now: Instant) -> Self {
        Self {
            fixed_dt: settings.fixed_dt,
            max_frame_delta: settings.max_frame_delta,
            max_ticks_per_frame: settings.max_ticks_per_frame,
            render_frame_target: settings.render_frame_target,
            accumulator: Duration::ZERO,
            last_frame: now,
            last_present: now,
        }
    }

    fn fixed_dt_seconds(&self) -> f32 {
        self.fixed_dt.as_secs_f32()
    }

    /// Long frames are clamped to `max_frame_delta` before they feed the accumulator.
    fn begin_frame(&mut self, now: Instant) -> FrameStart {
        let raw_dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        let clamped = raw_dt.min(self.max_frame_delta);
        let plan = plan_sim_steps(
            self.accumulator.saturating_add(clamped),
            self.fixed_dt,
            self.max_ticks_per_frame,
        );
        self.accumulator = plan.remaining_accumulator;
        FrameStart { raw_dt, plan }
    }

    fn ticks_in(&self, backlog: Duration) -> u32 {
        (backlog.as_nanos() / self.fixed_dt.as_nanos().max(1)) as u32
    }

    fn render_cap_sleep(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_present);
        match self.render_frame_target {
            Some(target) => target.saturating_sub(elapsed),
            None => Duration::ZERO,
        }
    }

    fn mark_presented(&mut self, now: Instant) {
        self.last_present = now;
    }
}

/// Only touches the OS title when the active scene reports a different one.
#[derive(Debug)]
struct WindowTitle {
    fallback: String,
    applied: Option<String>,
}

impl WindowTitle {
    fn new(fallback: String) -> Self {
        Self {
            fallback,
            applied: None,
        }
    }

    fn apply(&mut self, window: &Window, next: Option<String>) {
        if next == self.applied {
            return;
        }
        window.set_title(next.as_deref().unwrap_or(&self.fallback));
        self.applied = next;
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    switch_scene: PressEdge,
    overlay_toggle: PressEdge,
    interact: PressEdge,
    back: PressEdge,
    left_click: PressEdge,
    digits: [PressEdge; 9],
    action_states: ActionStates,
    cursor_position_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        if let PhysicalKey::Code(code) = key_event.physical_key {
            self.handle_key_code(code, is_pressed);
        }
    }

    fn handle_key_code(&mut self, code: KeyCode, is_pressed: bool) {
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            KeyCode::KeyS | KeyCode::ArrowDown => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            KeyCode::KeyA | KeyCode::ArrowLeft => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            KeyCode::KeyD | KeyCode::ArrowRight => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            KeyCode::KeyE | KeyCode::Space | KeyCode::Enter | KeyCode::NumpadEnter => {
                self.action_states.set(InputAction::Interact, is_pressed);
                self.interact.update(is_pressed);
            }
            KeyCode::Escape | KeyCode::Backspace => {
                self.action_states.set(InputAction::Back, is_pressed);
                self.back.update(is_pressed);
            }
            KeyCode::Tab => self.switch_scene.update(is_pressed),
            KeyCode::F3 => self.overlay_toggle.update(is_pressed),
            other => {
                if let Some(index) = DIGIT_KEYS.iter().position(|digit| *digit == other) {
                    self.digits[index].update(is_pressed);
                }
            }
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.left_click.update(state == ElementState::Pressed);
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        // Lowest digit wins when several were pressed within one tick; the rest are dropped.
        let mut digit_pressed = None;
        for (index, edge) in self.digits.iter_mut().enumerate() {
            if edge.take() && digit_pressed.is_none() {
                digit_pressed = Some(index as u8 + 1);
            }
        }
        InputSnapshot::new(
            self.switch_scene.take(),
            self.action_states,
            self.interact.take(),
            self.back.take(),
            digit_pressed,
            self.cursor_position_px,
            self.left_click.take(),
            self.window_width,
            self.window_height,
        )
    }

    fn take_overlay_toggle_pressed(&mut self) -> bool {
        self.overlay_toggle.take()
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2 { x, y });
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn parse_slow_frame_delay(
    value: Result<String, env::VarError>,
    config_slow_frame_ms: u64,
) -> Duration {
    match value {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}
