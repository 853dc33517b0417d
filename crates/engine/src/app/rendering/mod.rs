mod draw_list;
mod font;
mod renderer;
mod transform;

pub use draw_list::{Color, DrawCommand, DrawList};
pub use font::{text_width_px, GLYPH_ADVANCE_PX, LINE_ADVANCE_PX};
pub use renderer::Renderer;
pub use transform::{screen_to_canvas_px, Viewport};
