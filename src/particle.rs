use glam::Vec2;

use crate::depth::DepthProfile;
use crate::surface::{Rgb, Surface};

pub const FRICTION: f32 = 0.98;

/// Halo alpha relative to the particle's own.
const HALO_ALPHA: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    pub alpha: f32,
    pub size: f32,
    pub gravity: f32,
    pub friction: f32,
    pub fade_speed: f32,
    depth: DepthProfile,

    // Shape bursts pin particles here until the firework lets them go
    pub target: Vec2,
    pub shape_mode: bool,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, color: Rgb, gravity: f32, depth: DepthProfile) -> Self {
        Self {
            pos,
            vel,
            color,
            alpha: 1.0,
            size: (fastrand::f32() * 2.0 + 2.5) * depth.size_scale,
            gravity,
            friction: FRICTION,
            fade_speed: fastrand::f32() * 0.015 + 0.005,
            depth,
            target: pos,
            shape_mode: false,
        }
    }

    /// A motionless particle pinned to `target`.
    pub fn pinned(target: Vec2, color: Rgb, gravity: f32, depth: DepthProfile) -> Self {
        Self {
            size: (fastrand::f32() * 1.5 + 2.0) * depth.size_scale,
            shape_mode: true,
            ..Self::new(target, Vec2::ZERO, color, gravity, depth)
        }
    }

    pub fn depth(&self) -> &DepthProfile {
        &self.depth
    }

    pub fn update(&mut self) {
        self.pos += self.vel * self.depth.velocity_scale;
        self.vel.y += self.gravity * self.depth.gravity_scale;
        self.vel *= self.friction;
        self.alpha -= self.fade_speed * self.depth.fade_scale;
    }

    pub fn is_dead(&self) -> bool {
        self.alpha <= 0.0
    }

    pub fn draw(&self, surface: &mut Surface) {
        let alpha = self.alpha.max(0.0) * self.depth.alpha_scale;
        if self.depth.has_halo() {
            surface.fill_disc(self.pos, self.size * 1.5, self.color, alpha * HALO_ALPHA);
        }
        surface.fill_disc(self.pos, self.size, self.color, alpha);
    }
}
