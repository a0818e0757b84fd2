//! Procedural sound effects
//!
//! Play calls only enqueue a [`SoundCommand`]. Once per frame [`AudioManager::flush`]
//! expands each command into voices ([`design`]), renders them offline
//! ([`synth`]) and hands the buffer to an [`AudioBackend`]. With no backend,
//! or with sound turned off, every play call is a no-op.

pub mod design;
#[cfg(feature = "audio")]
pub mod device;
pub mod synth;

use crate::config::DEFAULT_VOLUME;
use crate::error::Result;
use synth::Voice;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundCommand {
    /// Rocket whoosh lasting `duration` seconds.
    Launch { duration: f32, depth: f32 },
    Explosion { depth: f32 },
    Crackle { depth: f32 },
}

impl SoundCommand {
    pub fn voices(&self, volume: f32) -> Vec<Voice> {
        match *self {
            SoundCommand::Launch { duration, depth } => design::launch(duration, depth, volume),
            SoundCommand::Explosion { depth } => design::explosion(depth, volume),
            SoundCommand::Crackle { depth } => design::crackle(depth, volume),
        }
    }
}

/// Somewhere rendered mono buffers can be played.
pub trait AudioBackend {
    fn sample_rate(&self) -> u32;

    /// Called once the user has interacted; may open the device.
    fn resume(&mut self) -> Result<()>;

    fn play(&mut self, samples: Vec<f32>) -> Result<()>;
}

pub struct AudioManager {
    backend: Option<Box<dyn AudioBackend>>,
    enabled: bool,
    volume: f32,
    resumed: bool,
    queue: Vec<SoundCommand>,
}

impl AudioManager {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend: Some(backend),
            enabled: true,
            volume: DEFAULT_VOLUME,
            resumed: false,
            queue: Vec::new(),
        }
    }

    /// A manager with no output; everything is dropped.
    pub fn silent() -> Self {
        Self {
            backend: None,
            enabled: true,
            volume: DEFAULT_VOLUME,
            resumed: false,
            queue: Vec::new(),
        }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    fn is_live(&self) -> bool {
        self.enabled && self.resumed && self.backend.is_some()
    }

    /// Opens the output. Until this succeeds, sounds are dropped.
    pub fn resume(&mut self) {
        if self.resumed {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        match backend.resume() {
            Ok(()) => {
                self.resumed = true;
                log::info!("audio resumed at {} Hz", backend.sample_rate());
            }
            Err(err) => {
                log::warn!("audio unavailable, continuing silently: {err}");
                self.backend = None;
            }
        }
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    pub fn play_launch(&mut self, duration: f32, depth: f32) {
        self.enqueue(SoundCommand::Launch { duration, depth });
    }

    pub fn play_explosion(&mut self, depth: f32) {
        self.enqueue(SoundCommand::Explosion { depth });
    }

    pub fn play_crackle(&mut self, depth: f32) {
        self.enqueue(SoundCommand::Crackle { depth });
    }

    fn enqueue(&mut self, command: SoundCommand) {
        if self.is_live() {
            self.queue.push(command);
        }
    }

    pub fn pending(&self) -> &[SoundCommand] {
        &self.queue
    }

    /// Renders and plays everything queued since the last flush.
    pub fn flush(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let volume = self.volume;
        let commands = std::mem::take(&mut self.queue);
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        let sample_rate = backend.sample_rate();
        for command in commands {
            let samples = synth::render(&command.voices(volume), sample_rate);
            if let Err(err) = backend.play(samples) {
                log::warn!("failed to play {command:?}: {err}");
            }
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.queue.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::silent()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::Error;

    /// Keeps the length of every buffer it is asked to play.
    #[derive(Clone, Default)]
    pub(crate) struct Recorder {
        pub played: Rc<RefCell<Vec<usize>>>,
        pub fail_resume: bool,
        pub fail_play: bool,
    }

    impl AudioBackend for Recorder {
        fn sample_rate(&self) -> u32 {
            8000
        }

        fn resume(&mut self) -> Result<()> {
            if self.fail_resume {
                return Err(Error::Audio("no device".into()));
            }
            Ok(())
        }

        fn play(&mut self, samples: Vec<f32>) -> Result<()> {
            if self.fail_play {
                return Err(Error::Audio("stream closed".into()));
            }
            self.played.borrow_mut().push(samples.len());
            Ok(())
        }
    }

    pub(crate) fn live_manager() -> (AudioManager, Rc<RefCell<Vec<usize>>>) {
        let recorder = Recorder::default();
        let played = recorder.played.clone();
        let mut audio = AudioManager::new(Box::new(recorder));
        audio.resume();
        (audio, played)
    }

    #[test]
    fn silent_manager_queues_nothing() {
        let mut audio = AudioManager::silent();
        audio.resume();
        audio.play_explosion(1.0);
        audio.play_crackle(1.0);
        assert!(audio.pending().is_empty());
        audio.flush();
    }

    #[test]
    fn sounds_before_resume_are_dropped() {
        let mut audio = AudioManager::new(Box::new(Recorder::default()));
        audio.play_explosion(1.0);
        assert!(audio.pending().is_empty());

        audio.resume();
        audio.play_explosion(1.0);
        assert_eq!(audio.pending(), [SoundCommand::Explosion { depth: 1.0 }]);
    }

    #[test]
    fn flush_renders_each_command() {
        let (mut audio, played) = live_manager();
        audio.play_launch(1.0, 0.9);
        audio.play_explosion(0.9);
        audio.flush();

        assert!(audio.pending().is_empty());
        // 1 s whoosh and 1.2 s bang at 8 kHz
        assert_eq!(*played.borrow(), vec![8000, 9600]);
    }

    #[test]
    fn disabled_manager_is_a_no_op() {
        let (mut audio, played) = live_manager();
        audio.play_crackle(1.0);
        audio.set_enabled(false);
        audio.play_explosion(1.0);
        audio.flush();

        assert!(!audio.is_enabled());
        assert!(played.borrow().is_empty());
    }

    #[test]
    fn failed_resume_goes_silent() {
        let mut audio = AudioManager::new(Box::new(Recorder {
            fail_resume: true,
            ..Default::default()
        }));
        audio.resume();

        assert!(!audio.has_backend());
        assert!(!audio.is_resumed());
        audio.play_explosion(1.0);
        assert!(audio.pending().is_empty());
    }

    #[test]
    fn play_errors_are_swallowed() {
        let recorder = Recorder {
            fail_play: true,
            ..Default::default()
        };
        let mut audio = AudioManager::new(Box::new(recorder));
        audio.resume();
        audio.play_explosion(0.5);
        audio.flush();
        assert!(audio.has_backend());
    }

    #[test]
    fn volume_is_clamped() {
        let mut audio = AudioManager::silent();
        assert_eq!(audio.volume(), DEFAULT_VOLUME);
        audio.set_volume(1.7);
        assert_eq!(audio.volume(), 1.0);
        audio.set_volume(-0.2);
        assert_eq!(audio.volume(), 0.0);
    }
}
