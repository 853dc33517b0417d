mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{
    screen_to_canvas_px, text_width_px, Color, DrawCommand, DrawList,
    Viewport, GLYPH_ADVANCE_PX, LINE_ADVANCE_PX,
};
pub use scene::{InputSnapshot, Scene, SceneCommand, SceneKey, DEFAULT_CANVAS};
