//! Audio format definitions
//!
//! The stream format is fixed end to end: 16-bit signed PCM, 44.1kHz, mono.

use std::time::Duration;

use crate::protocol::rtp::constants::BYTES_PER_SAMPLE;

/// Nominal sample rate in Hz
pub const SAMPLE_RATE: u32 = 44100;

/// Channel count
pub const CHANNELS: u16 = 1;

/// Audio format reported by capture sources and playback sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u16,
}

impl AudioFormat {
    /// L16 mono at 44.1kHz, the only format carried on the wire
    pub const L16_MONO: Self = Self {
        sample_rate: SAMPLE_RATE,
        channels: CHANNELS,
    };

    /// Create a new audio format
    #[must_use]
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Whether this format can be streamed without conversion
    #[must_use]
    pub fn is_supported(self) -> bool {
        self == Self::L16_MONO
    }

    /// Encoded bytes per second
    #[must_use]
    pub fn bytes_per_second(self) -> usize {
        BYTES_PER_SAMPLE * usize::from(self.channels) * self.sample_rate as usize
    }

    /// Calculate duration for given number of samples
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn samples_to_duration(self, samples: usize) -> Duration {
        Duration::from_secs_f64(samples as f64 / f64::from(self.sample_rate))
    }

    /// Calculate samples for given duration
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    #[must_use]
    pub fn duration_to_samples(self, duration: Duration) -> usize {
        (duration.as_secs_f64() * f64::from(self.sample_rate)) as usize
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::L16_MONO
    }
}
