use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Uniform scale plus letterbox offset that fits a fixed-size canvas inside the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CanvasTransform {
    pub(crate) scale: f32,
    pub(crate) offset_x: f32,
    pub(crate) offset_y: f32,
}

impl CanvasTransform {
    pub(crate) fn fit(window: Viewport, canvas: Viewport) -> Option<Self> {
        if window.width == 0 || window.height == 0 || canvas.width == 0 || canvas.height == 0 {
            return None;
        }
        let scale_x = window.width as f32 / canvas.width as f32;
        let scale_y = window.height as f32 / canvas.height as f32;
        let scale = scale_x.min(scale_y);
        Some(Self {
            scale,
            offset_x: (window.width as f32 - canvas.width as f32 * scale) * 0.5,
            offset_y: (window.height as f32 - canvas.height as f32 * scale) * 0.5,
        })
    }

    pub(crate) fn to_screen(self, point: Vec2) -> (i32, i32) {
        (
            (self.offset_x + point.x * self.scale).round() as i32,
            (self.offset_y + point.y * self.scale).round() as i32,
        )
    }

    pub(crate) fn scale_len(self, len: f32) -> i32 {
        (len * self.scale).round() as i32
    }
}

#[cfg(test)]
fn canvas_to_screen_px(window: Viewport, canvas: Viewport, point: Vec2) -> Option<(i32, i32)> {
    CanvasTransform::fit(window, canvas).map(|transform| transform.to_screen(point))
}

/// Maps a window-space cursor position onto the canvas.
/// Positions on the letterbox bars map to `None`.
pub fn screen_to_canvas_px(window: Viewport, canvas: Viewport, cursor_px: Vec2) -> Option<Vec2> {
    let transform = CanvasTransform::fit(window, canvas)?;
    let x = (cursor_px.x - transform.offset_x) / transform.scale;
    let y = (cursor_px.y - transform.offset_y) / transform.scale;
    if x < 0.0 || y < 0.0 || x >= canvas.width as f32 || y >= canvas.height as f32 {
        return None;
    }
    Some(Vec2 { x, y })
}
