//! Text rasterizers used by text-shaped bursts

use std::path::Path;

use rusttype::{Font, Scale, point};

use crate::error::{Error, Result};

/// Single-channel coverage buffer, 0 = transparent, 255 = opaque.
pub struct AlphaMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl AlphaMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn alpha(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Raises the coverage at `(x, y)`; out-of-bounds writes are dropped.
    pub fn cover(&mut self, x: i64, y: i64, alpha: u8) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let cell = &mut self.data[y as usize * self.width + x as usize];
        *cell = (*cell).max(alpha);
    }
}

pub trait GlyphRasterizer {
    /// Paints `text` at `font_px` pixels tall, centered on the mask.
    fn rasterize(&self, text: &str, font_px: f32, mask: &mut AlphaMask);
}

/// Built-in 5x7 bitmap font. Characters it has no glyph for paint nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct BitmapFont;

const GLYPH_COLS: usize = 5;
const GLYPH_ROWS: usize = 7;
const GLYPH_ADVANCE: usize = 6;

impl BitmapFont {
    fn glyph(c: char) -> Option<[u8; GLYPH_ROWS]> {
        let bits = match c.to_ascii_uppercase() {
            ' ' => [0; 7],
            '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
            '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
            '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
            '3' => [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
            '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
            '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
            '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
            '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
            '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
            '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
            'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
            'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
            'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
            'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
            'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
            'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
            'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
            'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
            'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
            'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
            'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
            'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
            'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
            'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
            'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
            'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
            'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
            'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
            'S' => [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
            'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
            'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
            'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100],
            'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
            'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
            'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
            'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
            '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
            '?' => [0b01110, 0b10001, 0b00001, 0b00110, 0b00100, 0b00000, 0b00100],
            '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100],
            ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100, 0b01000],
            '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
            '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
            '*' => [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000],
            '#' => [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
            '<' => [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010],
            '>' => [0b10000, 0b01000, 0b00100, 0b00010, 0b00100, 0b01000, 0b10000],
            ':' => [0b00000, 0b00100, 0b00100, 0b00000, 0b00100, 0b00100, 0b00000],
            '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
            _ => return None,
        };
        Some(bits)
    }
}

impl GlyphRasterizer for BitmapFont {
    fn rasterize(&self, text: &str, font_px: f32, mask: &mut AlphaMask) {
        let chars = text.chars().count();
        if chars == 0 || font_px <= 0.0 {
            return;
        }

        let dot = font_px / GLYPH_ROWS as f32;
        let text_width = ((chars * GLYPH_ADVANCE - 1) as f32) * dot;
        let origin_x = (mask.width() as f32 - text_width) / 2.0;
        let origin_y = (mask.height() as f32 - font_px) / 2.0;

        for (i, c) in text.chars().enumerate() {
            let Some(bits) = Self::glyph(c) else {
                continue;
            };
            let glyph_x = origin_x + (i * GLYPH_ADVANCE) as f32 * dot;

            for (row, row_bits) in bits.iter().enumerate() {
                for col in 0..GLYPH_COLS {
                    if row_bits & (1 << (GLYPH_COLS - 1 - col)) == 0 {
                        continue;
                    }
                    let x0 = (glyph_x + col as f32 * dot).round() as i64;
                    let y0 = (origin_y + row as f32 * dot).round() as i64;
                    let x1 = (glyph_x + (col + 1) as f32 * dot).round() as i64;
                    let y1 = (origin_y + (row + 1) as f32 * dot).round() as i64;
                    for y in y0..y1 {
                        for x in x0..x1 {
                            mask.cover(x, y, 255);
                        }
                    }
                }
            }
        }
    }
}

/// TrueType/OpenType font rendered with `rusttype`.
pub struct TrueTypeFont {
    font: Font<'static>,
}

impl TrueTypeFont {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| Error::Font {
            path: path.to_path_buf(),
            reason: "not a TrueType or OpenType font".into(),
        })?;
        Ok(Self { font })
    }
}

impl GlyphRasterizer for TrueTypeFont {
    fn rasterize(&self, text: &str, font_px: f32, mask: &mut AlphaMask) {
        let scale = Scale::uniform(font_px);
        let v_metrics = self.font.v_metrics(scale);
        let text_width = self
            .font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width);
        let text_height = v_metrics.ascent - v_metrics.descent;

        let start_x = (mask.width() as f32 - text_width) / 2.0;
        let start_y = (mask.height() as f32 - text_height) / 2.0 + v_metrics.ascent;

        for glyph in self.font.layout(text, scale, point(start_x, start_y)) {
            let Some(bounding_box) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let x = bounding_box.min.x as i64 + gx as i64;
                let y = bounding_box.min.y as i64 + gy as i64;
                mask.cover(x, y, (coverage * 255.0).round() as u8);
            });
        }
    }
}
