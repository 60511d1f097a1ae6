//! Minimal RTP framing for mono L16 audio
//!
//! Only the fixed 12-byte header and sequencing are used. There is no RTCP,
//! no CSRC list, no header extension and a single payload type.

mod packet;


pub use packet::{PayloadType, RtpDecodeError, RtpEncodeError, RtpHeader, RtpPacket};

/// RTP protocol constants
pub mod constants {
    /// RTP version carried in every header
    pub const RTP_VERSION: u8 = 2;

    /// Fixed header size in bytes
    pub const HEADER_SIZE: usize = 12;

    /// Payload type number for L16 mono 44.1kHz
    pub const L16_MONO_PAYLOAD_TYPE: u8 = 11;

    /// Default total packet budget (header + payload)
    pub const DEFAULT_MAX_PACKET_SIZE: usize = 1400;

    /// Largest packet one UDP/IPv4 datagram can carry
    pub const MAX_PACKET_SIZE: usize = 65507;

    /// Bytes per encoded sample
    pub const BYTES_PER_SAMPLE: usize = 2;
}
