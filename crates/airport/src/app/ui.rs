use engine::{text_width_px, Color, DrawList, Rect, Vec2, LINE_ADVANCE_PX};

pub(crate) const BUTTON_HEIGHT: f32 = 28.0;
pub(crate) const BUTTON_GAP: f32 = 8.0;
const BUTTON_FILL: Color = Color::rgb(0xEA, 0xF2, 0xF8);
const BUTTON_BORDER: Color = Color::rgb(0x1B, 0x4F, 0x72);
const BUTTON_TEXT: Color = Color::rgb(0x17, 0x20, 0x2A);

/// A clickable labelled rectangle in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MenuButton<A> {
    pub(crate) action: A,
    pub(crate) rect: Rect,
    pub(crate) label: String,
}

/// Lays buttons out top to bottom, each `width` wide, starting at `origin`.
pub(crate) fn stack_buttons<A>(
    origin: Vec2,
    width: f32,
    entries: impl IntoIterator<Item = (A, String)>,
) -> Vec<MenuButton<A>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(row, (action, label))| MenuButton {
            action,
            rect: Rect::new(
                origin.x,
                origin.y + row as f32 * (BUTTON_HEIGHT + BUTTON_GAP),
                width,
                BUTTON_HEIGHT,
            ),
            label,
        })
        .collect()
}

/// The action of the first button under the click, if any.
pub(crate) fn button_at<A: Copy>(buttons: &[MenuButton<A>], click: Option<Vec2>) -> Option<A> {
    let click = click?;
    buttons
        .iter()
        .find(|button| button.rect.contains_point(click))
        .map(|button| button.action)
}

pub(crate) fn draw_button<A>(draw: &mut DrawList, button: &MenuButton<A>) {
    draw.fill_rect(button.rect, BUTTON_FILL);
    draw.outline_rect(button.rect, BUTTON_BORDER);
    let text_y = button.rect.y + (button.rect.height - LINE_ADVANCE_PX) * 0.5 + 2.0;
    draw.text(
        Vec2::new(button.rect.x + 8.0, text_y),
        button.label.as_str(),
        BUTTON_TEXT,
    );
}

/// Greedy word wrap against the bitmap font width. A single word wider than the limit
/// gets a line of its own.
pub(crate) fn wrap_text(text: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if !line.is_empty() && text_width_px(&candidate) > max_width {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}
