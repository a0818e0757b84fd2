//! The show itself: rockets, bursts, timers and the frame they paint.

use glam::Vec2;

use crate::audio::AudioManager;
use crate::config::{Config, ConfigPatch};
use crate::depth::DepthProfile;
use crate::firework::{Firework, ShapeKind, SpawnContext};
use crate::glyphs::{BitmapFont, GlyphRasterizer};
use crate::rocket::Rocket;
use crate::scheduler::{Scheduler, TimerId};
use crate::surface::{DEFAULT_BG, Rgb, Surface};

/// Seconds between auto-fire volleys.
pub const AUTO_FIRE_INTERVAL: f32 = 1.5;

/// Gap between the launches of one volley.
pub const VOLLEY_STAGGER: f32 = 0.2;

/// Odds that a burst in shape mode takes a shape.
pub const SHAPE_CHANCE: f32 = 0.3;

/// Fade alpha at zero trail length; longer trails fade less per frame.
const MAX_FADE: f32 = 0.35;

/// Opening volley as (delay, viewport fraction).
const WELCOME_SHOW: [(f32, Vec2); 3] = [
    (0.5, Vec2::new(0.3, 0.3)),
    (0.8, Vec2::new(0.5, 0.25)),
    (1.1, Vec2::new(0.7, 0.35)),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum SimEvent {
    /// Launch toward a point given as a fraction of the viewport.
    LaunchAt(Vec2),
    RandomLaunch,
    AutoFire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub particle_count: usize,
    pub firework_count: usize,
    pub rocket_count: usize,
    pub fps: u32,
}

/// Frames per second, refreshed once per second of frame time.
struct FpsCounter {
    frames: u32,
    elapsed: f32,
    fps: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            elapsed: 0.0,
            fps: crate::TICKS_PER_SECOND as u32,
        }
    }

    fn record(&mut self, frame_time: f32) {
        self.frames += 1;
        self.elapsed += frame_time;
        if self.elapsed >= 1.0 {
            self.fps = (self.frames as f32 / self.elapsed).round() as u32;
            self.frames = 0;
            self.elapsed = 0.0;
        }
    }
}

pub struct Simulator {
    rockets: Vec<Rocket>,
    fireworks: Vec<Firework>,
    config: Config,
    scheduler: Scheduler<SimEvent>,
    auto_timer: Option<TimerId>,
    fps: FpsCounter,
    surface: Surface,
    audio: AudioManager,
    rasterizer: Box<dyn GlyphRasterizer>,
}

impl Simulator {
    /// A silent simulator on a `width` × `height` pixel surface.
    pub fn new(width: usize, height: usize, config: Config) -> Self {
        Self {
            rockets: Vec::new(),
            fireworks: Vec::new(),
            config,
            scheduler: Scheduler::new(),
            auto_timer: None,
            fps: FpsCounter::new(),
            surface: Surface::new(width, height, DEFAULT_BG),
            audio: AudioManager::silent(),
            rasterizer: Box::new(BitmapFont),
        }
    }

    pub fn with_background(mut self, bg: Rgb) -> Self {
        self.surface = Surface::new(self.surface.width(), self.surface.height(), bg);
        self
    }

    pub fn with_audio(mut self, audio: AudioManager) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Box<dyn GlyphRasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Viewport size in world units.
    pub fn viewport(&self) -> Vec2 {
        self.surface.world_size()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    /// Launches a rocket from the baseline straight below `(x, y)`.
    pub fn create_firework(&mut self, x: f32, y: f32) {
        let target = Vec2::new(x, y);
        let start = Vec2::new(x, self.viewport().y);

        match Rocket::launch(start, target) {
            Some(rocket) => {
                log::debug!("rocket launched toward {target} at depth {:.2}", rocket.depth().depth());
                self.audio
                    .play_launch(rocket.estimated_flight_time(), rocket.depth().depth());
                self.rockets.push(rocket);
            }
            // nowhere to fly, burst in place
            None => self.create_firework_direct(x, y, None),
        }
    }

    /// Bursts at `(x, y)` without a rocket. Depth defaults to nearest.
    pub fn create_firework_direct(&mut self, x: f32, y: f32, depth: Option<f32>) {
        let depth = depth.map_or_else(DepthProfile::default, DepthProfile::new);
        self.burst(Vec2::new(x, y), depth);
    }

    fn burst(&mut self, origin: Vec2, depth: DepthProfile) {
        let shape = (self.config.shape_mode && fastrand::f32() < SHAPE_CHANCE)
            .then(|| ShapeKind::random(self.config.burst_text()));

        let ctx = SpawnContext {
            config: &self.config,
            viewport: self.surface.world_size(),
            rasterizer: self.rasterizer.as_ref(),
        };
        let firework = Firework::new(origin, shape, depth, &ctx);

        self.audio.play_explosion(depth.depth());
        if firework.shape().is_some() {
            self.audio.play_crackle(depth.depth());
        }
        log::debug!(
            "burst at {origin} ({:?}, {} particles)",
            firework.shape(),
            firework.particle_count()
        );
        self.fireworks.push(firework);
    }

    /// Launches toward a random point in the upper part of the sky.
    pub fn create_random_firework(&mut self) {
        let viewport = self.viewport();
        let x = fastrand::f32() * viewport.x;
        let y = viewport.y * (0.1 + fastrand::f32() * 0.6);
        self.create_firework(x, y);
    }

    pub fn is_auto_mode(&self) -> bool {
        self.auto_timer.is_some()
    }

    pub fn start_auto_mode(&mut self) {
        if self.auto_timer.is_none() {
            self.auto_timer = Some(self.scheduler.every(AUTO_FIRE_INTERVAL, SimEvent::AutoFire));
            log::info!("auto mode on");
        }
    }

    /// Stops future volleys; launches already staggered still go up.
    pub fn stop_auto_mode(&mut self) {
        if let Some(id) = self.auto_timer.take() {
            self.scheduler.cancel(id);
            log::info!("auto mode off");
        }
    }

    /// Returns whether auto mode is now on.
    pub fn toggle_auto_mode(&mut self) -> bool {
        if self.is_auto_mode() {
            self.stop_auto_mode();
        } else {
            self.start_auto_mode();
        }
        self.is_auto_mode()
    }

    pub fn schedule_welcome_show(&mut self) {
        for (delay, fraction) in WELCOME_SHOW {
            self.scheduler.once(delay, SimEvent::LaunchAt(fraction));
        }
    }

    /// Applies to rockets and bursts created from now on.
    pub fn update_config(&mut self, patch: ConfigPatch) {
        log::debug!("config update: {patch:?}");
        self.config.apply(patch);
    }

    /// Removes every rocket and burst. Timers keep running.
    pub fn clear(&mut self) {
        self.rockets.clear();
        self.fireworks.clear();
        self.surface.clear();
    }

    /// Resizes the surface, in pixels.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.surface.resize(width, height);
    }

    fn handle(&mut self, event: SimEvent) {
        match event {
            SimEvent::LaunchAt(fraction) => {
                let target = fraction * self.viewport();
                self.create_firework(target.x, target.y);
            }
            SimEvent::RandomLaunch => self.create_random_firework(),
            SimEvent::AutoFire => {
                for i in 0..self.config.auto_firework_count {
                    if i == 0 {
                        self.create_random_firework();
                    } else {
                        self.scheduler.once(i as f32 * VOLLEY_STAGGER, SimEvent::RandomLaunch);
                    }
                }
            }
        }
    }

    /// One simulation tick, `dt` seconds of timer time.
    pub fn update(&mut self, dt: f32) {
        for event in self.scheduler.advance(dt) {
            self.handle(event);
        }

        let mut arrivals = Vec::new();
        self.rockets.retain_mut(|rocket| {
            rocket.update();
            if rocket.has_reached_target() && !rocket.is_exploded() {
                rocket.explode();
                arrivals.push((rocket.pos, *rocket.depth()));
                return false;
            }
            true
        });
        for (pos, depth) in arrivals {
            self.burst(pos, depth);
        }

        self.fireworks.retain_mut(|firework| {
            firework.update();
            !firework.is_dead()
        });
    }

    /// Paints one frame and plays the sounds queued since the last one.
    pub fn render(&mut self, frame_time: f32) {
        self.fps.record(frame_time);

        self.surface.fade(MAX_FADE - self.config.trail_length);
        for rocket in &self.rockets {
            rocket.draw(&mut self.surface);
        }
        for firework in &self.fireworks {
            firework.draw(&mut self.surface);
        }

        self.audio.flush();
    }

    pub fn stats(&self) -> Stats {
        Stats {
            particle_count: self.fireworks.iter().map(Firework::particle_count).sum(),
            firework_count: self.fireworks.len(),
            rocket_count: self.rockets.len(),
            fps: self.fps.fps,
        }
    }
}
