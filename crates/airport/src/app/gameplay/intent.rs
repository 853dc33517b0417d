use engine::{screen_to_canvas_px, InputAction, InputSnapshot, Vec2, Viewport};

use super::actors::MoveAxes;

/// What the player asked for during one tick, in world pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct TickIntent {
    pub(crate) axes: MoveAxes,
    pub(crate) interact: bool,
    pub(crate) back: bool,
    pub(crate) choice: Option<u8>,
    pub(crate) click: Option<Vec2>,
}

impl TickIntent {
    pub(crate) fn from_snapshot(input: &InputSnapshot, canvas: Viewport) -> Self {
        let click = if input.left_click_pressed() {
            input
                .cursor_position_px()
                .and_then(|cursor| screen_to_canvas_px(input.window_size(), canvas, cursor))
        } else {
            None
        };
        Self {
            axes: MoveAxes {
                up: input.is_down(InputAction::MoveUp),
                down: input.is_down(InputAction::MoveDown),
                left: input.is_down(InputAction::MoveLeft),
                right: input.is_down(InputAction::MoveRight),
            },
            interact: input.interact_pressed(),
            back: input.back_pressed(),
            choice: input.digit_pressed(),
            click,
        }
    }
}
