//! Playback sink backed by an in-memory circular buffer

use crate::audio::{AudioFormat, AudioOutputError, CircularBuffer, OutputState, PlaybackSink};

/// Playback device that renders nothing
///
/// The read cursor only moves when the test calls [`MemorySink::advance`],
/// and only while playing.
#[derive(Debug, Clone)]
pub struct MemorySink {
    buffer: CircularBuffer,
    format: AudioFormat,
    cursor: usize,
    state: OutputState,
    plays: usize,
    stops: usize,
    fail_writes: bool,
}

impl MemorySink {
    /// Create a sink with a buffer of `capacity` samples
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: CircularBuffer::new(capacity),
            format: AudioFormat::L16_MONO,
            cursor: 0,
            state: OutputState::Stopped,
            plays: 0,
            stops: 0,
            fail_writes: false,
        }
    }

    /// Report a different device format
    #[must_use]
    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    /// Consume `samples` if playing, wrapping the cursor
    ///
    /// Returns the samples actually played.
    pub fn advance(&mut self, samples: usize) -> usize {
        if self.state != OutputState::Playing {
            return 0;
        }
        self.cursor = (self.cursor + samples) % self.buffer.capacity();
        samples
    }

    /// Move the cursor directly, as a device report would
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor % self.buffer.capacity();
    }

    /// Make subsequent writes fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Buffer contents
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        self.buffer.as_slice()
    }

    /// Times playback was started
    #[must_use]
    pub fn plays(&self) -> usize {
        self.plays
    }

    /// Times playback was stopped
    #[must_use]
    pub fn stops(&self) -> usize {
        self.stops
    }
}

impl PlaybackSink for MemorySink {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    fn write(&mut self, offset: usize, samples: &[f32]) -> Result<(), AudioOutputError> {
        if self.fail_writes {
            return Err(AudioOutputError::DeviceError("write failed".to_string()));
        }
        let capacity = self.buffer.capacity();
        if offset >= capacity || offset + samples.len() > capacity {
            return Err(AudioOutputError::OffsetOutOfRange { offset, capacity });
        }
        self.buffer.write_at(offset, samples);
        Ok(())
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn play(&mut self) -> Result<(), AudioOutputError> {
        self.state = OutputState::Playing;
        self.plays += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioOutputError> {
        self.state = OutputState::Stopped;
        self.stops += 1;
        Ok(())
    }

    fn state(&self) -> OutputState {
        self.state
    }
}
