use super::Effect;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use glam::Vec2;
use skyburst::{ConfigPatch, Simulator, Stats, WORLD_UNITS_PER_PIXEL};
use std::io::{BufWriter, Stdout, Write};

const VOLUME_STEP: f32 = 0.1;
const PARTICLE_STEP: usize = 10;
const MIN_PARTICLES: usize = 10;

/// Seconds between stats lines in the log.
const STATS_INTERVAL: f32 = 5.0;

pub struct FireworksEffect {
    sim: Simulator,
    output_buf: Vec<u8>,
    since_stats: f32,
}

impl FireworksEffect {
    pub fn new(sim: Simulator) -> Self {
        let surface = sim.surface();
        let capacity = surface.width() * surface.height() * 25;
        Self {
            sim,
            output_buf: Vec::with_capacity(capacity),
            since_stats: 0.0,
        }
    }

    pub fn stats(&self) -> Stats {
        self.sim.stats()
    }

    /// World position at the middle of a terminal cell.
    fn cell_to_world(column: u16, row: u16) -> Vec2 {
        // each row holds two pixels
        Vec2::new(column as f32 + 0.5, row as f32 * 2.0 + 1.0) * WORLD_UNITS_PER_PIXEL
    }

    fn handle_key(&mut self, code: KeyCode) {
        let sim = &mut self.sim;
        match code {
            KeyCode::Char(' ') => sim.create_random_firework(),
            KeyCode::Char('a') => {
                sim.toggle_auto_mode();
            }
            KeyCode::Char('s') => {
                let shape_mode = !sim.config().shape_mode;
                sim.update_config(ConfigPatch {
                    shape_mode: Some(shape_mode),
                    ..Default::default()
                });
            }
            KeyCode::Char('c') => sim.clear(),
            KeyCode::Char('m') => {
                let audio = sim.audio_mut();
                audio.set_enabled(!audio.is_enabled());
                log::info!("sound {}", if audio.is_enabled() { "on" } else { "off" });
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let audio = sim.audio_mut();
                audio.set_volume(audio.volume() + VOLUME_STEP);
            }
            KeyCode::Char('-') => {
                let audio = sim.audio_mut();
                audio.set_volume(audio.volume() - VOLUME_STEP);
            }
            KeyCode::Char('[') | KeyCode::Char(']') => {
                let count = sim.config().particle_count;
                let count = if code == KeyCode::Char(']') {
                    count + PARTICLE_STEP
                } else {
                    count.saturating_sub(PARTICLE_STEP).max(MIN_PARTICLES)
                };
                sim.update_config(ConfigPatch {
                    particle_count: Some(count),
                    ..Default::default()
                });
            }
            _ => {}
        }
    }
}

impl Effect for FireworksEffect {
    fn update(&mut self, dt: f32) {
        self.sim.update(dt);

        self.since_stats += dt;
        if self.since_stats >= STATS_INTERVAL {
            self.since_stats = 0.0;
            log::debug!("{:?}", self.sim.stats());
        }
    }

    fn render(&mut self, stdout: &mut BufWriter<Stdout>, frame_time: f32) -> std::io::Result<()> {
        self.sim.render(frame_time);

        self.output_buf.clear();
        self.sim.surface().encode_half_blocks(&mut self.output_buf)?;
        stdout.write_all(&self.output_buf)?;
        stdout.flush()?;

        Ok(())
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.sim.resize(width, height);
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                // sound can only start after the user has done something
                self.sim.audio_mut().resume();
                self.handle_key(key.code);
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                self.sim.audio_mut().resume();
                let target = Self::cell_to_world(mouse.column, mouse.row);
                self.sim.create_firework(target.x, target.y);
            }
            _ => {}
        }
    }
}
