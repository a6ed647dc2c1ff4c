//! A tiny 3x5 block font, enough for coordinate labels and the default piece letters.

use crate::pixmap::{Color, Pixmap};

pub const GLYPH_W: i32 = 3;
pub const GLYPH_H: i32 = 5;

fn glyph_rows(ch: char) -> Option<[u8; GLYPH_H as usize]> {
    let rows = match ch.to_ascii_uppercase() {
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],

        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        _ => return None,
    };
    Some(rows)
}

/// Largest integer scale at which a glyph fits inside a `w`x`h` box, or 0 if it never fits.
pub fn fit_scale(w: i32, h: i32) -> i32 {
    (w / GLYPH_W).min(h / GLYPH_H).max(0)
}

/// Draws `ch` with its top-left at `(x, y)`, each font pixel `scale`x`scale` image pixels.
/// Unknown characters draw nothing.
pub fn draw_char(image: &mut Pixmap, x: i32, y: i32, ch: char, color: Color, scale: i32) {
    let Some(rows) = glyph_rows(ch) else {
        return;
    };
    let scale = scale.max(1);
    for (row, bits) in rows.into_iter().enumerate() {
        let py0 = y + row as i32 * scale;
        for col in 0..GLYPH_W {
            let mask = 1u8 << (GLYPH_W - 1 - col);
            if (bits & mask) == 0 {
                continue;
            }
            let px0 = x + col * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    image.blend_pixel(px0 + dx, py0 + dy, color);
                }
            }
        }
    }
}

/// Draws `ch` centered in the box `(x, y, w, h)` at the largest scale that fits.
pub fn draw_char_centered(image: &mut Pixmap, x: i32, y: i32, w: i32, h: i32, ch: char, color: Color) {
    let scale = fit_scale(w, h);
    if scale == 0 {
        return;
    }
    let gx = x + (w - GLYPH_W * scale) / 2;
    let gy = y + (h - GLYPH_H * scale) / 2;
    draw_char(image, gx, gy, ch, color, scale);
}
