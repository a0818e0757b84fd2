use std::f32::consts::TAU;

use glam::Vec2;

use crate::config::Config;
use crate::depth::DepthProfile;
use crate::glyphs::GlyphRasterizer;
use crate::particle::Particle;
use crate::shapes;
use crate::surface::{Rgb, Surface};

/// Ticks a shaped burst stays pinned before it scatters.
pub const SHAPE_HOLD_TICKS: u32 = 60;

/// Viewports narrower than this (in world units) use the compact layout.
pub const COMPACT_WIDTH: f32 = 768.0;

const PALETTES: [&[Rgb]; 7] = [
    // rainbow
    &[
        (255, 0, 128),
        (255, 140, 0),
        (255, 215, 0),
        (0, 255, 0),
        (0, 206, 209),
        (65, 105, 225),
        (147, 112, 219),
    ],
    // flame
    &[(255, 0, 0), (255, 69, 0), (255, 99, 71), (255, 127, 80), (255, 165, 0), (255, 215, 0)],
    // ice
    &[(0, 255, 255), (0, 206, 209), (30, 144, 255), (65, 105, 225), (100, 149, 237), (135, 206, 235)],
    // violet
    &[(255, 20, 147), (255, 105, 180), (218, 112, 214), (186, 85, 211), (147, 112, 219), (138, 43, 226)],
    // green
    &[(0, 255, 0), (0, 250, 154), (0, 255, 127), (127, 255, 0), (173, 255, 47), (124, 252, 0)],
    // gold
    &[(255, 215, 0), (255, 165, 0), (255, 140, 0), (255, 127, 80), (255, 99, 71), (255, 69, 0)],
    // silver
    &[(255, 255, 255), (240, 248, 255), (230, 230, 250), (216, 191, 216), (221, 160, 221), (238, 130, 238)],
];

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Heart,
    Star,
    Text(String),
}

impl ShapeKind {
    /// Heart, star or text with equal odds.
    pub fn random(text: &str) -> Self {
        match fastrand::usize(0..3) {
            0 => ShapeKind::Heart,
            1 => ShapeKind::Star,
            _ => ShapeKind::Text(text.to_string()),
        }
    }
}

/// What a new entity gets to read when it is built.
pub struct SpawnContext<'a> {
    pub config: &'a Config,
    /// Viewport size in world units.
    pub viewport: Vec2,
    pub rasterizer: &'a dyn GlyphRasterizer,
}

impl SpawnContext<'_> {
    pub fn is_compact(&self) -> bool {
        self.viewport.x < COMPACT_WIDTH
    }

    /// Particle budget for a burst of the given shape.
    pub fn particle_count(&self, shape: Option<&ShapeKind>) -> usize {
        let base = self.config.particle_count;
        let compact = self.is_compact();
        match shape {
            None => base,
            Some(ShapeKind::Text(text)) => {
                let (floor, per_char) = if compact { (300, 80) } else { (500, 120) };
                base.max(floor + text.chars().count() * per_char)
            }
            Some(_) => base.max(if compact { 150 } else { 200 }),
        }
    }

    fn shape_scale(&self) -> f32 {
        if self.is_compact() {
            (self.viewport.x / 400.0).min(1.0)
        } else {
            1.0
        }
    }

    /// Font size that keeps `chars` glyphs within 80% of the viewport.
    fn font_size(&self, chars: usize) -> f32 {
        let base = if self.is_compact() { 60.0 } else { 100.0 };
        let max_width = self.viewport.x * 0.8;
        if chars > 0 && base * chars as f32 > max_width {
            max_width / chars as f32
        } else {
            base
        }
    }
}

pub struct Firework {
    pub origin: Vec2,
    particles: Vec<Particle>,
    shape: Option<ShapeKind>,
    hold_ticks: u32,
    depth: DepthProfile,
}

impl Firework {
    pub fn new(origin: Vec2, shape: Option<ShapeKind>, depth: DepthProfile, ctx: &SpawnContext) -> Self {
        let count = ctx.particle_count(shape.as_ref());
        let palette = PALETTES[fastrand::usize(..PALETTES.len())];
        let pick = || palette[fastrand::usize(..palette.len())];
        let gravity = ctx.config.gravity;

        let particles = match &shape {
            Some(kind) => {
                let scale = ctx.shape_scale();
                let targets = match kind {
                    ShapeKind::Heart => shapes::heart(origin, count, 100.0 * scale),
                    ShapeKind::Star => shapes::star(origin, count, 50.0 * scale, 5),
                    ShapeKind::Text(text) => {
                        let font_size = ctx.font_size(text.chars().count());
                        shapes::text(origin, text, count, font_size, ctx.rasterizer)
                    }
                };
                targets
                    .into_iter()
                    .map(|target| Particle::pinned(target, pick(), gravity, depth))
                    .collect()
            }
            None => (0..count)
                .map(|i| {
                    let angle = TAU * i as f32 / count as f32;
                    let speed = fastrand::f32() * ctx.config.explosion_power + 2.0;
                    let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
                    Particle::new(origin, vel, pick(), gravity, depth)
                })
                .collect(),
        };

        Self {
            origin,
            particles,
            shape,
            hold_ticks: 0,
            depth,
        }
    }

    pub fn shape(&self) -> Option<&ShapeKind> {
        self.shape.as_ref()
    }

    pub fn depth(&self) -> &DepthProfile {
        &self.depth
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Still holding its silhouette.
    pub fn is_holding(&self) -> bool {
        self.shape.is_some() && self.hold_ticks < SHAPE_HOLD_TICKS
    }

    pub fn update(&mut self) {
        if self.is_holding() {
            self.hold_ticks += 1;
            for particle in self.particles.iter_mut().filter(|p| p.shape_mode) {
                particle.pos = particle.target;
            }
            return;
        }

        if self.shape.is_some() && self.hold_ticks == SHAPE_HOLD_TICKS {
            for particle in self.particles.iter_mut().filter(|p| p.shape_mode) {
                let angle = fastrand::f32() * TAU;
                let speed = fastrand::f32() * 1.5 + 0.5;
                particle.vel = Vec2::new(angle.cos(), angle.sin()) * speed;
                particle.shape_mode = false;
            }
            self.hold_ticks += 1;
        }

        self.particles.retain_mut(|particle| {
            particle.update();
            !particle.is_dead()
        });
    }

    pub fn draw(&self, surface: &mut Surface) {
        for particle in &self.particles {
            particle.draw(surface);
        }
    }

    pub fn is_dead(&self) -> bool {
        self.particles.is_empty()
    }
}
