//! Writes accepted payloads into the playback device's circular buffer

use crate::audio::convert::from_be_bytes;
use crate::audio::output::{AudioOutputError, PlaybackSink};

/// Depacketizer for one incoming stream
///
/// Sole owner of the absolute write position: the count of samples ever
/// written. Writes never block and never fail on overwrite; a reader more
/// than one buffer behind simply hears newer audio.
#[derive(Debug, Clone, Default)]
pub struct Depacketizer {
    write_position: u64,
}

impl Depacketizer {
    /// Create a depacketizer at write position 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples written since the stream opened
    #[must_use]
    pub fn write_position(&self) -> u64 {
        self.write_position
    }

    /// Decode a big-endian PCM payload and write it at the write position
    ///
    /// Runs crossing the end of the device buffer are split and continue at
    /// offset 0. Returns the number of samples written.
    ///
    /// # Errors
    ///
    /// Returns `AudioOutputError` if the device has no buffer or rejects a
    /// write; the write position is left unchanged.
    pub fn write<S: PlaybackSink + ?Sized>(
        &mut self,
        payload: &[u8],
        sink: &mut S,
    ) -> Result<usize, AudioOutputError> {
        let samples = from_be_bytes(payload);
        let capacity = sink.capacity();
        if capacity == 0 {
            return Err(AudioOutputError::OffsetOutOfRange {
                offset: 0,
                capacity,
            });
        }

        // Remainder is below capacity, so it fits in usize
        #[allow(clippy::cast_possible_truncation)]
        let mut offset = (self.write_position % capacity as u64) as usize;
        let mut remaining = samples.as_slice();

        while !remaining.is_empty() {
            let chunk = (capacity - offset).min(remaining.len());
            sink.write(offset, &remaining[..chunk])?;
            remaining = &remaining[chunk..];
            offset = (offset + chunk) % capacity;
        }

        self.write_position += samples.len() as u64;
        Ok(samples.len())
    }
}
