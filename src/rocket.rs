use std::collections::VecDeque;

use glam::Vec2;

use crate::depth::DepthProfile;
use crate::surface::{Rgb, Surface};

/// Units per tick along the launch direction.
pub const LAUNCH_SPEED: f32 = 5.0;

/// A rocket this close to its target has arrived.
pub const ARRIVAL_RADIUS: f32 = 10.0;

const MIN_DEPTH: f32 = 0.4;
const MAX_DEPTH: f32 = 1.0;

const COLORS: [Rgb; 6] = [
    (255, 215, 0),   // gold
    (255, 99, 71),   // tomato
    (0, 206, 209),   // turquoise
    (255, 20, 147),  // deep pink
    (0, 255, 0),     // lime
    (255, 140, 0),   // dark orange
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSample {
    pub pos: Vec2,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct Rocket {
    pub start: Vec2,
    pub pos: Vec2,
    pub target: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    depth: DepthProfile,
    trail: VecDeque<TrailSample>,
    exploded: bool,
    reached_target: bool,
}

impl Rocket {
    /// Launches toward `target` at a random depth.
    ///
    /// Returns `None` when start and target coincide, since there is no
    /// direction to fly in.
    pub fn launch(start: Vec2, target: Vec2) -> Option<Self> {
        Self::launch_at_depth(start, target, DepthProfile::random(MIN_DEPTH, MAX_DEPTH))
    }

    pub fn launch_at_depth(start: Vec2, target: Vec2, depth: DepthProfile) -> Option<Self> {
        let direction = (target - start).try_normalize()?;

        Some(Self {
            start,
            pos: start,
            target,
            vel: direction * LAUNCH_SPEED,
            color: COLORS[fastrand::usize(..COLORS.len())],
            depth,
            trail: VecDeque::with_capacity(depth.trail_capacity() + 1),
            exploded: false,
            reached_target: false,
        })
    }

    pub fn depth(&self) -> &DepthProfile {
        &self.depth
    }

    pub fn trail(&self) -> impl Iterator<Item = &TrailSample> {
        self.trail.iter()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub fn has_reached_target(&self) -> bool {
        self.reached_target
    }

    pub fn is_exploded(&self) -> bool {
        self.exploded
    }

    pub fn explode(&mut self) {
        self.exploded = true;
    }

    /// Seconds the flight should take at the simulation tick rate.
    pub fn estimated_flight_time(&self) -> f32 {
        self.start.distance(self.target) / (LAUNCH_SPEED * crate::TICKS_PER_SECOND)
    }

    pub fn update(&mut self) {
        if self.exploded {
            return;
        }

        self.trail.push_back(TrailSample {
            pos: self.pos,
            alpha: 1.0,
        });
        while self.trail.len() > self.depth.trail_capacity() {
            self.trail.pop_front();
        }

        let len = self.trail.len() as f32;
        for (i, sample) in self.trail.iter_mut().enumerate() {
            sample.alpha = (i + 1) as f32 / len;
        }

        self.pos += self.vel;

        if self.pos.distance(self.target) < ARRIVAL_RADIUS {
            self.reached_target = true;
        }
    }

    pub fn draw(&self, surface: &mut Surface) {
        if self.exploded {
            return;
        }

        let depth = self.depth.depth();
        let len = self.trail.len() as f32;
        for (i, sample) in self.trail.iter().enumerate() {
            let alpha = sample.alpha * 0.6 * (0.5 + depth * 0.5);
            let radius = (i + 1) as f32 / len * 3.0 * depth;
            surface.fill_disc(sample.pos, radius, self.color, alpha);
        }

        surface.fill_disc(self.pos, 4.0 * depth, self.color, 1.0);
        surface.fill_disc(self.pos, 8.0 * depth, self.color, 0.3 * depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rocket(depth: f32) -> Rocket {
        Rocket::launch_at_depth(
            Vec2::new(100.0, 600.0),
            Vec2::new(100.0, 100.0),
            DepthProfile::new(depth),
        )
        .unwrap()
    }

    #[test]
    fn flies_at_launch_speed() {
        let rocket = rocket(1.0);
        assert!((rocket.vel - Vec2::new(0.0, -LAUNCH_SPEED)).length() < 1e-6);
    }

    #[test]
    fn zero_distance_launch_is_refused() {
        let spot = Vec2::new(50.0, 50.0);
        assert!(Rocket::launch(spot, spot).is_none());
    }

    #[test]
    fn random_depth_stays_in_range() {
        for _ in 0..100 {
            let rocket = Rocket::launch(Vec2::ZERO, Vec2::new(0.0, -100.0)).unwrap();
            let depth = rocket.depth().depth();
            assert!((MIN_DEPTH..=MAX_DEPTH).contains(&depth));
        }
    }

    #[test]
    fn arrives_when_first_within_ten_units() {
        let mut rocket = rocket(1.0);
        let mut ticks = 0;
        while !rocket.has_reached_target() {
            assert!(rocket.pos.distance(rocket.target) >= ARRIVAL_RADIUS);
            rocket.update();
            ticks += 1;
            assert!(ticks < 1000);
        }
        // 500 units at 5 per tick, flagged once inside the 10 unit radius
        assert_eq!(ticks, 99);
        assert!(rocket.pos.distance(rocket.target) < ARRIVAL_RADIUS);
    }

    #[test]
    fn trail_is_capped_and_brightens_toward_the_head() {
        let mut rocket = rocket(0.5);
        for _ in 0..30 {
            rocket.update();
        }
        assert_eq!(rocket.trail_len(), 10);

        let alphas: Vec<f32> = rocket.trail().map(|s| s.alpha).collect();
        assert!((alphas[0] - 0.1).abs() < 1e-6);
        assert_eq!(*alphas.last().unwrap(), 1.0);
        assert!(alphas.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn exploded_rockets_stop() {
        let mut rocket = rocket(1.0);
        rocket.update();
        rocket.explode();
        rocket.explode();
        let pos = rocket.pos;
        let trail = rocket.trail_len();

        rocket.update();
        assert!(rocket.is_exploded());
        assert_eq!(rocket.pos, pos);
        assert_eq!(rocket.trail_len(), trail);
    }

    #[test]
    fn flight_time_matches_tick_rate() {
        let rocket = rocket(1.0);
        assert!((rocket.estimated_flight_time() - 500.0 / 300.0).abs() < 1e-5);
    }
}
