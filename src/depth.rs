//! Parallax coefficients derived from a depth value
//!
//! Depth runs from 0.3 (far) to 1.0 (near). Far things move and fall slower,
//! are smaller and dimmer, and fade out faster.

pub const MIN_DEPTH: f32 = 0.3;
pub const MAX_DEPTH: f32 = 1.0;

/// Particles nearer than this get a soft halo.
const HALO_DEPTH: f32 = 0.7;

/// Trail samples a rocket at depth 1.0 keeps.
const FULL_TRAIL: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthProfile {
    depth: f32,
    pub velocity_scale: f32,
    pub gravity_scale: f32,
    pub fade_scale: f32,
    pub size_scale: f32,
    pub alpha_scale: f32,
}

impl DepthProfile {
    pub fn new(depth: f32) -> Self {
        let depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);
        Self {
            depth,
            velocity_scale: depth,
            gravity_scale: depth,
            fade_scale: 1.5 - depth * 0.5,
            size_scale: depth,
            alpha_scale: 0.4 + depth * 0.6,
        }
    }

    /// Uniform depth in `[min, max)`.
    pub fn random(min: f32, max: f32) -> Self {
        Self::new(min + fastrand::f32() * (max - min))
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn trail_capacity(&self) -> usize {
        (FULL_TRAIL * self.depth).floor() as usize
    }

    pub fn has_halo(&self) -> bool {
        self.depth > HALO_DEPTH
    }
}

impl Default for DepthProfile {
    fn default() -> Self {
        Self::new(MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn far_fades_faster_than_near() {
        let far = DepthProfile::new(0.3);
        let near = DepthProfile::new(1.0);
        assert!(far.fade_scale > near.fade_scale);
        assert_eq!(near.fade_scale, 1.0);
        assert!((far.alpha_scale - 0.58).abs() < 1e-6);
    }

    #[test]
    fn depth_is_clamped() {
        assert_eq!(DepthProfile::new(0.0).depth(), MIN_DEPTH);
        assert_eq!(DepthProfile::new(4.0).depth(), MAX_DEPTH);
    }

    #[test]
    fn trail_capacity_scales_with_depth() {
        assert_eq!(DepthProfile::new(1.0).trail_capacity(), 20);
        assert_eq!(DepthProfile::new(0.5).trail_capacity(), 10);
        assert_eq!(DepthProfile::new(0.43).trail_capacity(), 8);
    }

    #[test]
    fn halo_only_up_close() {
        assert!(DepthProfile::new(0.8).has_halo());
        assert!(!DepthProfile::new(0.7).has_halo());
    }
}
