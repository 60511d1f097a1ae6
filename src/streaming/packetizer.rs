//! Splits captured sample runs into MTU-sized RTP packets

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use crate::audio::convert::{put_samples_be, to_i16};
use crate::error::{Result, StreamError};
use crate::protocol::rtp::RtpHeader;
use crate::protocol::rtp::constants::{BYTES_PER_SAMPLE, HEADER_SIZE, MAX_PACKET_SIZE};

/// Per-stream sender counters
///
/// Both fields wrap silently: the sequence number modulo 2^16, the
/// timestamp modulo 2^32.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderState {
    /// Sequence number of the next packet
    pub sequence: u16,
    /// Elapsed send time in milliseconds
    pub timestamp: u32,
}

/// RTP packetizer for one outgoing stream
#[derive(Debug, Clone)]
pub struct Packetizer {
    state: SenderState,
    max_packet_size: usize,
    /// Elapsed time not yet reflected in the timestamp, always under 1ms
    residual: Duration,
}

impl Packetizer {
    /// Create a packetizer with fresh stream state
    ///
    /// # Errors
    ///
    /// Returns `StreamError::InvalidParameter` if `max_packet_size` cannot
    /// hold the header plus one sample or exceeds a UDP payload.
    pub fn new(max_packet_size: usize) -> Result<Self> {
        Self::with_state(max_packet_size, SenderState::default())
    }

    /// Create a packetizer continuing from `state`
    ///
    /// # Errors
    ///
    /// Returns `StreamError::InvalidParameter` if `max_packet_size` cannot
    /// hold the header plus one sample or exceeds a UDP payload.
    pub fn with_state(max_packet_size: usize, state: SenderState) -> Result<Self> {
        if max_packet_size < HEADER_SIZE + BYTES_PER_SAMPLE {
            return Err(StreamError::invalid_parameter(
                "max_packet_size",
                format!("{max_packet_size} bytes cannot hold a header and one sample"),
            ));
        }
        if max_packet_size > MAX_PACKET_SIZE {
            return Err(StreamError::invalid_parameter(
                "max_packet_size",
                format!(
                    "{max_packet_size} bytes exceeds the {MAX_PACKET_SIZE}-byte UDP payload limit"
                ),
            ));
        }
        Ok(Self {
            state,
            max_packet_size,
            residual: Duration::ZERO,
        })
    }

    /// Maximum packet size including the header
    #[must_use]
    pub fn max_packet_size(&self) -> usize {
        self.max_packet_size
    }

    /// Whole samples that fit in one packet's payload
    #[must_use]
    pub fn samples_per_packet(&self) -> usize {
        (self.max_packet_size - HEADER_SIZE) / BYTES_PER_SAMPLE
    }

    /// Current stream state
    #[must_use]
    pub fn state(&self) -> SenderState {
        self.state
    }

    /// Sequence number the next packet will carry
    #[must_use]
    pub fn sequence(&self) -> u16 {
        self.state.sequence
    }

    /// Timestamp the next packets will carry
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        self.state.timestamp
    }

    /// Split a run of PCM samples into packets
    ///
    /// Every packet gets the next sequence number; all packets of one call
    /// share the current timestamp. An empty run yields no packets.
    pub fn packetize(&mut self, samples: &[i16]) -> Vec<Bytes> {
        samples
            .chunks(self.samples_per_packet())
            .map(|chunk| {
                let header = RtpHeader::new_audio(self.state.sequence, self.state.timestamp);
                self.state.sequence = self.state.sequence.wrapping_add(1);

                let mut packet = BytesMut::with_capacity(HEADER_SIZE + chunk.len() * BYTES_PER_SAMPLE);
                packet.put_slice(&header.encode());
                put_samples_be(&mut packet, chunk);
                packet.freeze()
            })
            .collect()
    }

    /// Convert normalized samples and split them into packets
    pub fn packetize_f32(&mut self, samples: &[f32]) -> Vec<Bytes> {
        self.packetize(&to_i16(samples))
    }

    /// Close a capture cycle, advancing the timestamp by its wall-clock length
    ///
    /// Sub-millisecond remainders carry into the next cycle, so the timestamp
    /// tracks total elapsed time.
    pub fn finish_cycle(&mut self, elapsed: Duration) {
        let total = self.residual + elapsed;
        self.residual = Duration::from_nanos(u64::from(total.subsec_nanos() % 1_000_000));

        // Reduced modulo 2^32 like the wire field
        #[allow(clippy::cast_possible_truncation)]
        let millis = total.as_millis() as u32;
        self.state.timestamp = self.state.timestamp.wrapping_add(millis);
    }
}
