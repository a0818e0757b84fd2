//! Persistent RGB raster the simulator paints into
//!
//! Frames are never cleared: each frame first fades the previous one toward
//! the background, which is what leaves streaks behind moving sparks.

use std::io::Write;

use glam::Vec2;

use crate::WORLD_UNITS_PER_PIXEL;
use crate::error::{Error, Result};

pub type Rgb = (u8, u8, u8);

/// Night sky behind the show.
pub const DEFAULT_BG: Rgb = (10, 10, 26);

/// Parses `RRGGBB` or `#RRGGBB`.
pub fn parse_hex_color(hex: &str) -> Result<Rgb> {
    let digits = hex.trim_start_matches('#');
    let invalid = || Error::InvalidColor(hex.to_string());
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
    };

    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 3]>,
    bg: Rgb,
}

impl Surface {
    /// A `width` × `height` pixel raster filled with `bg`.
    pub fn new(width: usize, height: usize, bg: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![to_linear(bg); width * height],
            bg,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Viewport size in world units.
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * WORLD_UNITS_PER_PIXEL
    }

    pub fn background(&self) -> Rgb {
        self.bg
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![to_linear(self.bg); width * height];
    }

    pub fn clear(&mut self) {
        self.pixels.fill(to_linear(self.bg));
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let [r, g, b] = self.pixels[y * self.width + x];
        (r.round() as u8, g.round() as u8, b.round() as u8)
    }

    /// Composites the background over the whole frame at `alpha`.
    pub fn fade(&mut self, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let bg = to_linear(self.bg);
        for pixel in &mut self.pixels {
            blend(pixel, bg, alpha);
        }
    }

    /// Alpha-blends a disc given in world units.
    ///
    /// Discs smaller than a pixel light the pixel they fall in.
    pub fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        if alpha <= 0.0 || self.pixels.is_empty() {
            return;
        }

        let color = to_linear(color);
        let c = center / WORLD_UNITS_PER_PIXEL;
        let r = radius.max(0.0) / WORLD_UNITS_PER_PIXEL;

        if r < 0.5 {
            if let Some(idx) = self.index(c.x.floor() as i64, c.y.floor() as i64) {
                blend(&mut self.pixels[idx], color, alpha.min(1.0));
            }
            return;
        }

        let min_x = (c.x - r - 0.5).floor() as i64;
        let max_x = (c.x + r + 0.5).ceil() as i64;
        let min_y = (c.y - r - 0.5).floor() as i64;
        let max_y = (c.y + r + 0.5).ceil() as i64;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let Some(idx) = self.index(px, py) else {
                    continue;
                };
                let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5).distance(c);
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    blend(&mut self.pixels[idx], color, (alpha * coverage).min(1.0));
                }
            }
        }
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Encodes the frame as 24-bit ANSI half blocks, two pixel rows per
    /// text row: background carries the top pixel, foreground the bottom.
    pub fn encode_half_blocks(&self, out: &mut Vec<u8>) -> std::io::Result<()> {
        out.extend_from_slice(b"\x1b[H");

        let mut prev_top: Option<Rgb> = None;
        let mut prev_bot: Option<Rgb> = None;

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top = self.pixel(x, y);
                let bot = if y + 1 < self.height {
                    self.pixel(x, y + 1)
                } else {
                    top
                };

                if prev_top != Some(top) {
                    write!(out, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = Some(top);
                }
                if prev_bot != Some(bot) {
                    write!(out, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = Some(bot);
                }

                out.extend_from_slice("▄".as_bytes());
            }
            out.extend_from_slice(b"\x1b[0m");
            prev_top = None;
            prev_bot = None;
            if y + 2 < self.height {
                out.extend_from_slice(b"\r\n");
            }
        }

        Ok(())
    }
}

fn to_linear(color: Rgb) -> [f32; 3] {
    [color.0 as f32, color.1 as f32, color.2 as f32]
}

fn blend(pixel: &mut [f32; 3], color: [f32; 3], alpha: f32) {
    for (p, c) in pixel.iter_mut().zip(color) {
        *p = *p * (1.0 - alpha) + c * alpha;
    }
}
