//! Audio output abstraction
//!
//! Playback devices own a fixed-length circular buffer. The receiver writes
//! into it at explicit offsets and polls the device's read cursor.

use crate::audio::format::AudioFormat;

/// Errors from audio output
#[derive(Debug, thiserror::Error)]
pub enum AudioOutputError {
    /// Device not found
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Format not supported
    #[error("Format not supported: {0:?}")]
    FormatNotSupported(AudioFormat),

    /// Stream error
    #[error("Stream error: {0}")]
    StreamError(String),

    /// Generic device error
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Write offset beyond the device buffer
    #[error("Offset {offset} out of range for capacity {capacity}")]
    OffsetOutOfRange {
        /// Requested offset
        offset: usize,
        /// Device buffer capacity
        capacity: usize,
    },

    /// Output closed
    #[error("Output closed")]
    Closed,
}

/// Audio output state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    /// Stopped
    Stopped,
    /// Playing
    Playing,
}

/// Playback device with an internal circular buffer
pub trait PlaybackSink {
    /// Format the device renders
    fn format(&self) -> AudioFormat {
        AudioFormat::L16_MONO
    }

    /// Buffer capacity in samples
    fn capacity(&self) -> usize;

    /// Write samples at `offset` within the device buffer
    ///
    /// Callers never let a run cross the end of the buffer.
    ///
    /// # Errors
    ///
    /// Returns `AudioOutputError` if the device rejected the write.
    fn write(&mut self, offset: usize, samples: &[f32]) -> Result<(), AudioOutputError>;

    /// Current read cursor in samples, in `0..capacity()`
    fn cursor(&self) -> usize;

    /// Start playback from the current cursor
    ///
    /// # Errors
    ///
    /// Returns `AudioOutputError` if the device cannot start.
    fn play(&mut self) -> Result<(), AudioOutputError>;

    /// Stop playback, leaving the cursor where it is
    ///
    /// # Errors
    ///
    /// Returns `AudioOutputError` if the device cannot stop.
    fn stop(&mut self) -> Result<(), AudioOutputError>;

    /// Get current state
    fn state(&self) -> OutputState;
}

impl<T: PlaybackSink + ?Sized> PlaybackSink for Box<T> {
    fn format(&self) -> AudioFormat {
        (**self).format()
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn write(&mut self, offset: usize, samples: &[f32]) -> Result<(), AudioOutputError> {
        (**self).write(offset, samples)
    }

    fn cursor(&self) -> usize {
        (**self).cursor()
    }

    fn play(&mut self) -> Result<(), AudioOutputError> {
        (**self).play()
    }

    fn stop(&mut self) -> Result<(), AudioOutputError> {
        (**self).stop()
    }

    fn state(&self) -> OutputState {
        (**self).state()
    }
}
