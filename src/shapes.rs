//! Silhouette generators for shaped bursts
//!
//! Every generator returns exactly `n` positions. Positions may repeat when
//! the source has fewer distinct samples than requested.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;

use crate::glyphs::{AlphaMask, GlyphRasterizer};

/// Inner radius of a star as a fraction of the outer radius.
pub const STAR_INNER_RATIO: f32 = 0.382;

/// Radius of the ring used when text rasterizes to nothing.
pub const TEXT_FALLBACK_RADIUS: f32 = 50.0;

const TEXT_OVERSAMPLE: f32 = 2.0;
const OPAQUE_THRESHOLD: u8 = 128;

/// Classic quartic heart, `size` 100 spans roughly 80 × 70 units × 2.5.
pub fn heart(center: Vec2, n: usize, size: f32) -> Vec<Vec2> {
    let scale = size / 100.0 * 2.5;
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32 * TAU;
            let x = 16.0 * t.sin().powi(3);
            let y = -(13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos());
            center + Vec2::new(x, y) * scale
        })
        .collect()
}

/// Star outline with `points` tips, starting at the top.
pub fn star(center: Vec2, n: usize, size: f32, points: usize) -> Vec<Vec2> {
    let edges = points * 2;
    if n == 0 || edges == 0 {
        return Vec::new();
    }

    let step = PI / points as f32;
    let vertices: Vec<Vec2> = (0..edges)
        .map(|i| {
            let radius = if i % 2 == 0 { size } else { size * STAR_INNER_RATIO };
            let angle = i as f32 * step - FRAC_PI_2;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect();

    let per_edge = n / edges;
    let remainder = n % edges;

    let mut positions = Vec::with_capacity(n);
    for i in 0..edges {
        let start = vertices[i];
        let end = vertices[(i + 1) % edges];
        let count = per_edge + usize::from(i < remainder);
        for j in 0..count {
            positions.push(start.lerp(end, j as f32 / count as f32));
        }
    }
    positions
}

/// Text silhouette sampled from a 2x oversampled rasterization.
pub fn text(
    center: Vec2,
    text: &str,
    n: usize,
    font_size: f32,
    rasterizer: &dyn GlyphRasterizer,
) -> Vec<Vec2> {
    if n == 0 {
        return Vec::new();
    }

    let mut pixels = text_pixels(text, font_size, rasterizer);
    if pixels.is_empty() {
        return ring(center, n, TEXT_FALLBACK_RADIUS);
    }

    fastrand::shuffle(&mut pixels);
    (0..n).map(|i| center + pixels[i % pixels.len()]).collect()
}

/// Opaque pixel offsets from the text center, in unscaled units.
fn text_pixels(text: &str, font_size: f32, rasterizer: &dyn GlyphRasterizer) -> Vec<Vec2> {
    let render_size = font_size * TEXT_OVERSAMPLE;
    let chars = text.chars().count();
    let width = (chars as f32 * render_size * 1.5).max(1000.0) as usize;
    let height = (render_size * 3.0).max(1.0) as usize;

    let mut mask = AlphaMask::new(width, height);
    rasterizer.rasterize(text, render_size, &mut mask);

    let stride = ((render_size / 20.0).floor() as usize).max(2);
    let half = Vec2::new(width as f32, height as f32) / 2.0;

    let mut pixels = Vec::new();
    for y in (0..height).step_by(stride) {
        for x in (0..width).step_by(stride) {
            if mask.alpha(x, y) > OPAQUE_THRESHOLD {
                pixels.push((Vec2::new(x as f32, y as f32) - half) / TEXT_OVERSAMPLE);
            }
        }
    }
    pixels
}

fn ring(center: Vec2, n: usize, radius: f32) -> Vec<Vec2> {
    (0..n)
        .map(|i| {
            let angle = TAU * i as f32 / n as f32;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}
