//! Speaker output through rodio's default device.

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle};

use super::AudioBackend;
use crate::error::{Error, Result};

pub const SAMPLE_RATE: u32 = 44_100;

/// Opens the default output stream on the first [`resume`](AudioBackend::resume).
#[derive(Default)]
pub struct RodioBackend {
    // The stream stops playing when dropped, so it lives as long as the handle.
    stream: Option<(OutputStream, OutputStreamHandle)>,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for RodioBackend {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn resume(&mut self) -> Result<()> {
        if self.stream.is_none() {
            let stream = OutputStream::try_default().map_err(|e| Error::Audio(e.to_string()))?;
            self.stream = Some(stream);
        }
        Ok(())
    }

    fn play(&mut self, samples: Vec<f32>) -> Result<()> {
        let Some((_, handle)) = &self.stream else {
            return Err(Error::Audio("output stream not open".into()));
        };
        handle
            .play_raw(SamplesBuffer::new(1, SAMPLE_RATE, samples))
            .map_err(|e| Error::Audio(e.to_string()))
    }
}
