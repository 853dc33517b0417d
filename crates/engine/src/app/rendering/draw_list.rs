use crate::geometry::{Rect, Vec2};

use super::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Parses `#RRGGBB`; anything else yields `None`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    OutlineRect {
        rect: Rect,
        color: Color,
    },
    Text {
        position: Vec2,
        text: String,
        color: Color,
    },
}

/// Per-frame drawing output of a scene, expressed in canvas pixels.
///
/// Commands are painted in insertion order; the renderer scales the canvas to the window.
#[derive(Debug, Clone)]
pub struct DrawList {
    canvas: Viewport,
    clear_color: Color,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(canvas: Viewport) -> Self {
        Self {
            canvas,
            clear_color: Color::BLACK,
            commands: Vec::new(),
        }
    }

    pub(crate) fn reset(&mut self, canvas: Viewport) {
        self.canvas = canvas;
        self.clear_color = Color::BLACK;
        self.commands.clear();
    }

    pub fn canvas(&self) -> Viewport {
        self.canvas
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    pub fn outline_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::OutlineRect { rect, color });
    }

    pub fn text(&mut self, position: Vec2, text: impl Into<String>, color: Color) {
        self.commands.push(DrawCommand::Text {
            position,
            text: text.into(),
            color,
        });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text lines in paint order; handy for asserting on what a scene shows.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
