use thiserror::Error;

use super::constants::{HEADER_SIZE, L16_MONO_PAYLOAD_TYPE, RTP_VERSION};

/// RTP payload types understood by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PayloadType {
    /// L16 mono 44100Hz, big-endian signed 16-bit samples
    L16Mono = L16_MONO_PAYLOAD_TYPE,
}

impl PayloadType {
    /// Parse from the second header byte (marker bit is masked off)
    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        match b & 0x7F {
            L16_MONO_PAYLOAD_TYPE => Some(Self::L16Mono),
            _ => None,
        }
    }
}

/// RTP header (12 bytes, no CSRC list, no extension)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpHeader {
    /// Version (2 bits, always 2)
    pub version: u8,
    /// Padding flag
    pub padding: bool,
    /// Extension flag
    pub extension: bool,
    /// CSRC count (4 bits)
    pub csrc_count: u8,
    /// Marker bit
    pub marker: bool,
    /// Payload type (7 bits)
    pub payload_type: PayloadType,
    /// Sequence number (16 bits)
    pub sequence: u16,
    /// Timestamp in elapsed send milliseconds (32 bits)
    pub timestamp: u32,
    /// Synchronization source ID (32 bits)
    pub ssrc: u32,
}

impl RtpHeader {
    /// Standard RTP header size
    pub const SIZE: usize = HEADER_SIZE;

    /// Create an L16 mono audio header
    ///
    /// Padding, extension and CSRC count are cleared, the marker bit is set
    /// and the SSRC is zero.
    #[must_use]
    pub fn new_audio(sequence: u16, timestamp: u32) -> Self {
        Self {
            version: RTP_VERSION,
            padding: false,
            extension: false,
            csrc_count: 0,
            marker: true,
            payload_type: PayloadType::L16Mono,
            sequence,
            timestamp,
            ssrc: 0,
        }
    }

    /// Encode header to bytes
    #[must_use]
    pub fn encode(&self) -> [u8; 12] {
        let mut buf = [0u8; 12];

        // Byte 0: V(2) | P(1) | X(1) | CC(4)
        buf[0] = (self.version << 6)
            | (u8::from(self.padding) << 5)
            | (u8::from(self.extension) << 4)
            | (self.csrc_count & 0x0F);

        // Byte 1: M(1) | PT(7)
        buf[1] = (u8::from(self.marker) << 7) | (self.payload_type as u8 & 0x7F);

        buf[2..4].copy_from_slice(&self.sequence.to_be_bytes());
        buf[4..8].copy_from_slice(&self.timestamp.to_be_bytes());
        buf[8..12].copy_from_slice(&self.ssrc.to_be_bytes());

        buf
    }

    /// Encode header into `buf` starting at `offset`
    ///
    /// Returns the number of bytes written (always [`RtpHeader::SIZE`]).
    ///
    /// # Errors
    ///
    /// Returns `RtpEncodeError::BufferTooSmall` if fewer than 12 bytes remain
    /// after `offset`.
    pub fn encode_at(&self, buf: &mut [u8], offset: usize) -> Result<usize, RtpEncodeError> {
        let end = offset
            .checked_add(Self::SIZE)
            .filter(|end| *end <= buf.len())
            .ok_or(RtpEncodeError::BufferTooSmall {
                needed: offset.saturating_add(Self::SIZE),
                have: buf.len(),
            })?;

        buf[offset..end].copy_from_slice(&self.encode());
        Ok(Self::SIZE)
    }

    /// Decode header from bytes
    ///
    /// # Errors
    ///
    /// Returns `RtpDecodeError` if the buffer is shorter than 12 bytes, the
    /// version is not 2, or the payload type is not L16 mono.
    pub fn decode(buf: &[u8]) -> Result<Self, RtpDecodeError> {
        if buf.len() < Self::SIZE {
            return Err(RtpDecodeError::BufferTooSmall {
                needed: Self::SIZE,
                have: buf.len(),
            });
        }

        let version = (buf[0] >> 6) & 0x03;
        if version != RTP_VERSION {
            return Err(RtpDecodeError::InvalidVersion(version));
        }

        let payload_type_byte = buf[1] & 0x7F;
        let payload_type = PayloadType::from_byte(payload_type_byte)
            .ok_or(RtpDecodeError::UnknownPayloadType(payload_type_byte))?;

        Ok(Self {
            version,
            padding: (buf[0] >> 5) & 0x01 != 0,
            extension: (buf[0] >> 4) & 0x01 != 0,
            csrc_count: buf[0] & 0x0F,
            marker: (buf[1] >> 7) & 0x01 != 0,
            payload_type,
            sequence: u16::from_be_bytes([buf[2], buf[3]]),
            timestamp: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            ssrc: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
        })
    }
}

/// RTP decode errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RtpDecodeError {
    /// Datagram shorter than the fixed header
    #[error("buffer too small: need {needed} bytes, have {have}")]
    BufferTooSmall {
        /// Bytes required
        needed: usize,
        /// Bytes available
        have: usize,
    },

    /// Version bits other than 2
    #[error("invalid RTP version: {0}")]
    InvalidVersion(u8),

    /// Payload type other than L16 mono
    #[error("unknown payload type: {0}")]
    UnknownPayloadType(u8),
}

impl RtpDecodeError {
    /// Whether the datagram was foreign RTP traffic rather than garbage
    #[must_use]
    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::UnknownPayloadType(_))
    }
}

/// RTP encode errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RtpEncodeError {
    /// Destination buffer cannot hold the header at the requested offset
    #[error("buffer too small: need {needed} bytes, have {have}")]
    BufferTooSmall {
        /// Bytes required
        needed: usize,
        /// Bytes available
        have: usize,
    },
}

/// Complete RTP packet with header and payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    /// Packet header
    pub header: RtpHeader,
    /// Payload data (big-endian 16-bit PCM)
    pub payload: Vec<u8>,
}

impl RtpPacket {
    /// Create a new RTP packet
    #[must_use]
    pub fn new(header: RtpHeader, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    /// Create an audio packet
    #[must_use]
    pub fn audio(sequence: u16, timestamp: u32, audio_data: Vec<u8>) -> Self {
        Self {
            header: RtpHeader::new_audio(sequence, timestamp),
            payload: audio_data,
        }
    }

    /// Total encoded length
    #[must_use]
    pub fn len(&self) -> usize {
        RtpHeader::SIZE + self.payload.len()
    }

    /// Whether the packet carries no audio
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Encode packet to bytes
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len());
        buf.extend_from_slice(&self.header.encode());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Decode packet from bytes
    ///
    /// # Errors
    ///
    /// Returns `RtpDecodeError` if the header is rejected.
    pub fn decode(buf: &[u8]) -> Result<Self, RtpDecodeError> {
        let header = RtpHeader::decode(buf)?;
        let payload = buf[RtpHeader::SIZE..].to_vec();
        Ok(Self { header, payload })
    }

    /// Payload as signed 16-bit samples
    ///
    /// A trailing odd byte is ignored.
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.payload
            .chunks_exact(2)
            .map(|chunk| i16::from_be_bytes([chunk[0], chunk[1]]))
    }
}
