//! skyburst - fireworks simulation and procedural sound synthesis
//!
//! The engine is host agnostic: it simulates rockets and bursts in world
//! units, paints them onto a [`Surface`], and queues sounds on an
//! [`AudioManager`]. The `skyburst` binary drives it inside a terminal.

pub mod audio;
pub mod config;
pub mod depth;
pub mod error;
pub mod firework;
pub mod glyphs;
pub mod particle;
pub mod rocket;
pub mod scheduler;
pub mod shapes;
pub mod simulator;
pub mod surface;

pub use audio::{AudioBackend, AudioManager, SoundCommand};
pub use config::{AppConfig, Config, ConfigPatch};
pub use depth::DepthProfile;
pub use error::{Error, Result};
pub use firework::{Firework, ShapeKind};
pub use particle::Particle;
pub use rocket::Rocket;
pub use simulator::{Simulator, Stats};
pub use surface::{Rgb, Surface};

/// World units covered by one raster pixel along each axis.
pub const WORLD_UNITS_PER_PIXEL: f32 = 8.0;

/// Simulation ticks per second; physics constants are expressed per tick.
pub const TICKS_PER_SECOND: f32 = 60.0;
