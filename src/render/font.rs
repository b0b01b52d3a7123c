//! 5x8 bitmap glyphs for raster labels.

use super::CHAR_SIZE;

/// Row bitmaps, MSB = leftmost column. Characters without a glyph render as `?`.
fn glyph(c: char) -> &'static [u8; 8] {
    match c {
        ' ' => &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        '-' => &[0x00, 0x00, 0x00, 0xF8, 0x00, 0x00, 0x00, 0x00],
        '.' => &[0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x20, 0x00],
        '0' => &[0x70, 0x88, 0x98, 0xA8, 0xC8, 0x88, 0x70, 0x00],
        '1' => &[0x20, 0x60, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00],
        '2' => &[0x70, 0x88, 0x08, 0x30, 0x40, 0x80, 0xF8, 0x00],
        '3' => &[0xF8, 0x10, 0x20, 0x10, 0x08, 0x88, 0x70, 0x00],
        '4' => &[0x10, 0x30, 0x50, 0x90, 0xF8, 0x10, 0x10, 0x00],
        '5' => &[0xF8, 0x80, 0xF0, 0x08, 0x08, 0x88, 0x70, 0x00],
        '6' => &[0x30, 0x40, 0x80, 0xF0, 0x88, 0x88, 0x70, 0x00],
        '7' => &[0xF8, 0x08, 0x10, 0x20, 0x40, 0x40, 0x40, 0x00],
        '8' => &[0x70, 0x88, 0x88, 0x70, 0x88, 0x88, 0x70, 0x00],
        '9' => &[0x70, 0x88, 0x88, 0x78, 0x08, 0x10, 0x60, 0x00],
        ':' => &[0x00, 0x00, 0x20, 0x00, 0x00, 0x20, 0x00, 0x00],
        '?' => &[0x70, 0x88, 0x08, 0x10, 0x20, 0x00, 0x20, 0x00],
        'A' => &[0x70, 0x88, 0x88, 0xF8, 0x88, 0x88, 0x88, 0x00],
        'B' => &[0xF0, 0x88, 0x88, 0xF0, 0x88, 0x88, 0xF0, 0x00],
        'C' => &[0x70, 0x88, 0x80, 0x80, 0x80, 0x88, 0x70, 0x00],
        'D' => &[0xE0, 0x90, 0x88, 0x88, 0x88, 0x90, 0xE0, 0x00],
        'E' => &[0xF8, 0x80, 0x80, 0xF0, 0x80, 0x80, 0xF8, 0x00],
        'F' => &[0xF8, 0x80, 0x80, 0xF0, 0x80, 0x80, 0x80, 0x00],
        'G' => &[0x70, 0x88, 0x80, 0xB8, 0x88, 0x88, 0x70, 0x00],
        'H' => &[0x88, 0x88, 0x88, 0xF8, 0x88, 0x88, 0x88, 0x00],
        'I' => &[0x70, 0x20, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00],
        'J' => &[0x38, 0x10, 0x10, 0x10, 0x10, 0x90, 0x60, 0x00],
        'K' => &[0x88, 0x90, 0xA0, 0xC0, 0xA0, 0x90, 0x88, 0x00],
        'L' => &[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0xF8, 0x00],
        'M' => &[0x88, 0xD8, 0xA8, 0xA8, 0x88, 0x88, 0x88, 0x00],
        'N' => &[0x88, 0xC8, 0xA8, 0x98, 0x88, 0x88, 0x88, 0x00],
        'O' => &[0x70, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70, 0x00],
        'P' => &[0xF0, 0x88, 0x88, 0xF0, 0x80, 0x80, 0x80, 0x00],
        'Q' => &[0x70, 0x88, 0x88, 0x88, 0xA8, 0x90, 0x68, 0x00],
        'R' => &[0xF0, 0x88, 0x88, 0xF0, 0xA0, 0x90, 0x88, 0x00],
        'S' => &[0x70, 0x88, 0x80, 0x70, 0x08, 0x88, 0x70, 0x00],
        'T' => &[0xF8, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x00],
        'U' => &[0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70, 0x00],
        'V' => &[0x88, 0x88, 0x88, 0x88, 0x88, 0x50, 0x20, 0x00],
        'W' => &[0x88, 0x88, 0x88, 0xA8, 0xA8, 0xD8, 0x88, 0x00],
        'X' => &[0x88, 0x88, 0x50, 0x20, 0x50, 0x88, 0x88, 0x00],
        'Y' => &[0x88, 0x88, 0x50, 0x20, 0x20, 0x20, 0x20, 0x00],
        'Z' => &[0xF8, 0x08, 0x10, 0x20, 0x40, 0x80, 0xF8, 0x00],
        '_' => &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF8, 0x00],
        'a' => &[0x00, 0x00, 0x70, 0x08, 0x78, 0x88, 0x78, 0x00],
        'b' => &[0x80, 0x80, 0xB0, 0xC8, 0x88, 0x88, 0xF0, 0x00],
        'c' => &[0x00, 0x00, 0x70, 0x80, 0x80, 0x88, 0x70, 0x00],
        'd' => &[0x08, 0x08, 0x68, 0x98, 0x88, 0x88, 0x78, 0x00],
        'e' => &[0x00, 0x00, 0x70, 0x88, 0xF8, 0x80, 0x70, 0x00],
        'f' => &[0x30, 0x48, 0x40, 0xE0, 0x40, 0x40, 0x40, 0x00],
        'g' => &[0x00, 0x00, 0x78, 0x88, 0x78, 0x08, 0x70, 0x00],
        'h' => &[0x80, 0x80, 0xB0, 0xC8, 0x88, 0x88, 0x88, 0x00],
        'i' => &[0x20, 0x00, 0x60, 0x20, 0x20, 0x20, 0x70, 0x00],
        'j' => &[0x10, 0x00, 0x30, 0x10, 0x10, 0x90, 0x60, 0x00],
        'k' => &[0x80, 0x80, 0x90, 0xA0, 0xC0, 0xA0, 0x90, 0x00],
        'l' => &[0x60, 0x20, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00],
        'm' => &[0x00, 0x00, 0xD0, 0xA8, 0xA8, 0xA8, 0xA8, 0x00],
        'n' => &[0x00, 0x00, 0xB0, 0xC8, 0x88, 0x88, 0x88, 0x00],
        'o' => &[0x00, 0x00, 0x70, 0x88, 0x88, 0x88, 0x70, 0x00],
        'p' => &[0x00, 0x00, 0xF0, 0x88, 0xF0, 0x80, 0x80, 0x00],
        'q' => &[0x00, 0x00, 0x78, 0x88, 0x78, 0x08, 0x08, 0x00],
        'r' => &[0x00, 0x00, 0xB0, 0xC8, 0x80, 0x80, 0x80, 0x00],
        's' => &[0x00, 0x00, 0x70, 0x80, 0x70, 0x08, 0xF0, 0x00],
        't' => &[0x40, 0x40, 0xE0, 0x40, 0x40, 0x48, 0x30, 0x00],
        'u' => &[0x00, 0x00, 0x88, 0x88, 0x88, 0x98, 0x68, 0x00],
        'v' => &[0x00, 0x00, 0x88, 0x88, 0x88, 0x50, 0x20, 0x00],
        'w' => &[0x00, 0x00, 0x88, 0x88, 0xA8, 0xA8, 0x50, 0x00],
        'x' => &[0x00, 0x00, 0x88, 0x50, 0x20, 0x50, 0x88, 0x00],
        'y' => &[0x00, 0x00, 0x88, 0x88, 0x78, 0x08, 0x70, 0x00],
        'z' => &[0x00, 0x00, 0xF8, 0x10, 0x20, 0x40, 0xF8, 0x00],
        _ => &[0x70, 0x88, 0x08, 0x10, 0x20, 0x00, 0x20, 0x00],
    }
}

/// Blit one glyph into an RGB buffer of the given row width, clipping at the edges.
pub(crate) fn write_char(buffer: &mut [u8], width: u32, base_x: i64, base_y: i64, c: char, rgb: (u8, u8, u8)) {
    let data = glyph(c);
    let height = buffer.len() as i64 / (width as i64 * 3);
    let ratio = (CHAR_SIZE / 8) as i64;
    for (j, row) in data.iter().enumerate() {
        for z in 0..8i64 {
            if (row >> (7 - z)) & 1 == 0 {
                continue;
            }
            for ry in 0..ratio {
                for rx in 0..ratio {
                    let px = base_x + z * ratio + rx;
                    let py = base_y + j as i64 * ratio + ry;
                    if px < 0 || py < 0 || px >= width as i64 || py >= height {
                        continue;
                    }
                    let idx = ((py * width as i64 + px) * 3) as usize;
                    buffer[idx] = rgb.0;
                    buffer[idx + 1] = rgb.1;
                    buffer[idx + 2] = rgb.2;
                }
            }
        }
    }
}

/// Draw `text` so that its right edge ends at `right_x`.
pub(crate) fn write_text_right(buffer: &mut [u8], width: u32, right_x: i64, base_y: i64, text: &str) {
    let n = text.chars().count() as i64;
    let start = right_x - n * CHAR_SIZE as i64;
    write_text(buffer, width, start, base_y, text);
}

/// Draw `text` centered on `center_x`.
pub(crate) fn write_text_centered(buffer: &mut [u8], width: u32, center_x: i64, base_y: i64, text: &str) {
    let n = text.chars().count() as i64;
    let start = center_x - n * CHAR_SIZE as i64 / 2;
    write_text(buffer, width, start, base_y, text);
}

pub(crate) fn write_text(buffer: &mut [u8], width: u32, base_x: i64, base_y: i64, text: &str) {
    for (i, c) in text.chars().enumerate() {
        write_char(buffer, width, base_x + i as i64 * CHAR_SIZE as i64, base_y, c, (0, 0, 0));
    }
}
