use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::geometry::{Rect, Vec2};

use super::font::{glyph_rows, GLYPH_HEIGHT, GLYPH_WIDTH, TEXT_SCALE};
use super::transform::CanvasTransform;
use super::{Color, DrawCommand, DrawList, Viewport};

const LETTERBOX_COLOR: [u8; 4] = [12, 12, 16, 255];
const OVERLAY_TEXT_COLOR: [u8; 4] = [244, 248, 252, 255];
const OVERLAY_PANEL_COLOR: [u8; 4] = [10, 12, 16, 255];
const OVERLAY_PADDING_PX: i32 = 8;
const OVERLAY_TEXT_SCALE: i32 = 2;

pub struct Renderer {
    window: &'static Window,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: &'static Window) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(window, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(self.window, width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: &'static Window,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render(
        &mut self,
        draw_list: &DrawList,
        overlay_lines: Option<&[String]>,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let frame = self.pixels.frame_mut();
        rasterize(frame, self.viewport, draw_list);
        if let Some(lines) = overlay_lines {
            draw_overlay(frame, self.viewport, lines);
        }
        self.pixels.render()
    }
}

pub(crate) fn rasterize(frame: &mut [u8], viewport: Viewport, draw_list: &DrawList) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&LETTERBOX_COLOR);
    }
    let Some(transform) = CanvasTransform::fit(viewport, draw_list.canvas()) else {
        return;
    };

    let canvas = draw_list.canvas();
    let canvas_rect = Rect::new(0.0, 0.0, canvas.width as f32, canvas.height as f32);
    fill_rect_px(
        frame,
        viewport,
        screen_rect(transform, canvas_rect),
        draw_list.clear_color().0,
    );

    for command in draw_list.commands() {
        match command {
            DrawCommand::FillRect { rect, color } => {
                fill_rect_px(frame, viewport, screen_rect(transform, *rect), color.0);
            }
            DrawCommand::OutlineRect { rect, color } => {
                outline_rect_px(frame, viewport, screen_rect(transform, *rect), color.0);
            }
            DrawCommand::Text {
                position,
                text,
                color,
            } => {
                let (x, y) = transform.to_screen(*position);
                let glyph_scale = transform.scale_len(TEXT_SCALE as f32).max(1);
                draw_text_px(frame, viewport, x, y, text, *color, glyph_scale);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRectPx {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

fn screen_rect(transform: CanvasTransform, rect: Rect) -> ScreenRectPx {
    let (left, top) = transform.to_screen(rect.position());
    let (right, bottom) = transform.to_screen(Vec2::new(rect.right(), rect.bottom()));
    ScreenRectPx {
        left,
        top,
        right,
        bottom,
    }
}

fn fill_rect_px(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    let left = rect.left.max(0);
    let top = rect.top.max(0);
    let right = rect.right.min(viewport.width as i32);
    let bottom = rect.bottom.min(viewport.height as i32);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, viewport, x, y, color);
        }
    }
}

fn outline_rect_px(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    if rect.right - rect.left < 2 || rect.bottom - rect.top < 2 {
        return;
    }
    for x in rect.left..rect.right {
        write_pixel_rgba_clipped(frame, viewport, x, rect.top, color);
        write_pixel_rgba_clipped(frame, viewport, x, rect.bottom - 1, color);
    }
    for y in rect.top..rect.bottom {
        write_pixel_rgba_clipped(frame, viewport, rect.left, y, color);
        write_pixel_rgba_clipped(frame, viewport, rect.right - 1, y, color);
    }
}

fn draw_text_px(
    frame: &mut [u8],
    viewport: Viewport,
    mut x: i32,
    y: i32,
    text: &str,
    color: Color,
    glyph_scale: i32,
) {
    let advance = (GLYPH_WIDTH + 1) * glyph_scale;
    for ch in text.chars() {
        for (row_index, row_bits) in glyph_rows(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                    continue;
                }
                let cell = ScreenRectPx {
                    left: x + col * glyph_scale,
                    top: y + row_index as i32 * glyph_scale,
                    right: x + (col + 1) * glyph_scale,
                    bottom: y + (row_index as i32 + 1) * glyph_scale,
                };
                fill_rect_px(frame, viewport, cell, color.0);
            }
        }
        x += advance;
    }
}

fn draw_overlay(frame: &mut [u8], viewport: Viewport, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let advance = (GLYPH_WIDTH + 1) * OVERLAY_TEXT_SCALE;
    let line_height = (GLYPH_HEIGHT + 2) * OVERLAY_TEXT_SCALE;
    let longest = lines
        .iter()
        .map(|line| line.chars().count() as i32)
        .max()
        .unwrap_or(0);
    let panel_width = longest * advance + OVERLAY_PADDING_PX * 2;
    let panel_height = lines.len() as i32 * line_height + OVERLAY_PADDING_PX * 2;
    let panel_left = viewport.width as i32 - panel_width;
    fill_rect_px(
        frame,
        viewport,
        ScreenRectPx {
            left: panel_left,
            top: 0,
            right: viewport.width as i32,
            bottom: panel_height,
        },
        OVERLAY_PANEL_COLOR,
    );

    let mut y = OVERLAY_PADDING_PX;
    for line in lines {
        draw_text_px(
            frame,
            viewport,
            panel_left + OVERLAY_PADDING_PX,
            y,
            line,
            Color(OVERLAY_TEXT_COLOR),
            OVERLAY_TEXT_SCALE,
        );
        y += line_height;
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], viewport: Viewport, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= viewport.width as i32 || y >= viewport.height as i32 {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(viewport.width as usize)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
