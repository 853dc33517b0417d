//! 3x5 bitmap font covering printable ASCII.

pub(crate) const GLYPH_WIDTH: i32 = 3;
pub(crate) const GLYPH_HEIGHT: i32 = 5;
/// Canvas pixels per glyph cell.
pub(crate) const TEXT_SCALE: i32 = 2;
pub const GLYPH_ADVANCE_PX: f32 = ((GLYPH_WIDTH + 1) * TEXT_SCALE) as f32;
pub const LINE_ADVANCE_PX: f32 = ((GLYPH_HEIGHT + 2) * TEXT_SCALE) as f32;

const FIRST_PRINTABLE: u32 = ' ' as u32;

// Rows are packed top to bottom, three bits each, most significant row first.
const GLYPHS: [u16; 95] = [
    0x0000, 0x2482, 0x5A00, 0x5F7D, 0x7DDF, 0x52A5, 0x2AAB, 0x2400,
    0x1491, 0x4494, 0x0AA8, 0x05D0, 0x0014, 0x01C0, 0x0002, 0x12A4,
    0x7B6F, 0x2C97, 0x73E7, 0x73CF, 0x5BC9, 0x79CF, 0x79EF, 0x7292,
    0x7BEF, 0x7BCF, 0x0410, 0x0414, 0x1511, 0x0E38, 0x4454, 0x72C2,
    0x7BE7, 0x2BED, 0x6BAE, 0x7927, 0x6B6E, 0x79A7, 0x79A4, 0x796F,
    0x5BED, 0x7497, 0x726F, 0x5BAD, 0x4927, 0x5FED, 0x5FFD, 0x7B6F,
    0x6BA4, 0x7B79, 0x6BAD, 0x79CF, 0x7492, 0x5B6F, 0x5B6A, 0x5BFD,
    0x5AAD, 0x5A92, 0x72A7, 0x6926, 0x4889, 0x324B, 0x2A00, 0x0007,
    0x4400, 0x0E7F, 0x49AE, 0x0F27, 0x13EF, 0x0FA7, 0x39A4, 0x0F79,
    0x49AD, 0x2092, 0x106A, 0x4BAD, 0x4927, 0x0DED, 0x0D6D, 0x0F6F,
    0x0D74, 0x0F79, 0x0D64, 0x0F8F, 0x2E93, 0x0B6F, 0x0B6A, 0x0B7A,
    0x0A95, 0x0B79, 0x0E57, 0x3593, 0x2492, 0x64D6, 0x0780,
];

pub(crate) fn glyph_rows(ch: char) -> [u8; GLYPH_HEIGHT as usize] {
    let packed = (ch as u32)
        .checked_sub(FIRST_PRINTABLE)
        .and_then(|index| GLYPHS.get(index as usize))
        .copied()
        .unwrap_or(0);
    let mut rows = [0u8; GLYPH_HEIGHT as usize];
    for (row_index, row) in rows.iter_mut().enumerate() {
        let shift = (GLYPH_HEIGHT as usize - 1 - row_index) * GLYPH_WIDTH as usize;
        *row = ((packed >> shift) & 0b111) as u8;
    }
    rows
}

pub fn text_width_px(text: &str) -> f32 {
    text.chars().count() as f32 * GLYPH_ADVANCE_PX
}
