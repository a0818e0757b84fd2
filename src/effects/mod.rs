use crossterm::event::Event;
use std::io::{BufWriter, Stdout};

pub mod fireworks;

pub trait Effect {
    fn update(&mut self, dt: f32);
    fn render(&mut self, stdout: &mut BufWriter<Stdout>, frame_time: f32) -> std::io::Result<()>;
    /// New size in pixels: terminal columns by twice the rows.
    fn resize(&mut self, width: usize, height: usize);
    fn handle_event(&mut self, _event: &Event) {}
}
