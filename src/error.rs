use std::io;
use thiserror::Error;

use crate::audio::{AudioFormat, AudioOutputError, CaptureError};
use crate::protocol::rtp::{RtpDecodeError, RtpEncodeError};

/// Errors that can occur while opening or driving a stream
#[derive(Debug, Error)]
pub enum StreamError {
    // ===== Transport Errors =====
    /// Socket I/O error
    #[error("network error: {0}")]
    NetworkError(#[from] io::Error),

    /// The socket accepted fewer bytes than the packet holds
    #[error("partial send: {sent} of {expected} bytes")]
    PartialSend {
        /// Bytes the transport accepted
        sent: usize,
        /// Bytes in the packet
        expected: usize,
    },

    // ===== Device Errors =====
    /// Neither the requested nor the fallback device could be opened
    #[error("device unavailable: {device} - {message}")]
    DeviceUnavailable {
        /// The requested device
        device: String,
        /// Description of the failure
        message: String,
    },

    /// Playback device failure
    #[error("playback error: {0}")]
    Playback(#[from] AudioOutputError),

    /// Capture device failure
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Device format differs from the wire format
    #[error("unsupported audio format: {format:?}")]
    UnsupportedFormat {
        /// The format the device reported
        format: AudioFormat,
    },

    // ===== Protocol Errors =====
    /// RTP decode failure
    #[error("RTP decode error: {0}")]
    Decode(#[from] RtpDecodeError),

    /// RTP encode failure
    #[error("RTP encode error: {0}")]
    Encode(#[from] RtpEncodeError),

    // ===== Configuration Errors =====
    /// Invalid parameter provided
    #[error("invalid parameter: {name} - {message}")]
    InvalidParameter {
        /// The name of the parameter
        name: String,
        /// Description of the error
        message: String,
    },

    /// Configuration document could not be parsed
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    // ===== State Errors =====
    /// Operation on a stream that was already torn down
    #[error("stream closed")]
    Closed,
}

impl StreamError {
    /// Whether this error came from the socket layer
    #[must_use]
    pub fn is_transport_fault(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::PartialSend { .. })
    }

    /// Whether this error came from a capture or playback device
    #[must_use]
    pub fn is_device_fault(&self) -> bool {
        matches!(
            self,
            Self::DeviceUnavailable { .. }
                | Self::Playback(_)
                | Self::Capture(_)
                | Self::UnsupportedFormat { .. }
        )
    }

    /// Whether the stream must be torn down after this error
    ///
    /// Transport and device faults leave the stream half-broken; configuration
    /// errors only occur before a stream exists.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.is_transport_fault() || self.is_device_fault() || matches!(self, Self::Closed)
    }

    pub(crate) fn invalid_parameter(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StreamError::PartialSend {
            sent: 10,
            expected: 712,
        };
        assert_eq!(err.to_string(), "partial send: 10 of 712 bytes");
    }

    #[test]
    fn test_transport_faults() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err: StreamError = io_err.into();

        assert!(matches!(err, StreamError::NetworkError(_)));
        assert!(err.is_transport_fault());
        assert!(err.is_fatal());
        assert!(!err.is_device_fault());
    }

    #[test]
    fn test_device_faults() {
        let err: StreamError = AudioOutputError::Closed.into();
        assert!(err.is_device_fault());
        assert!(err.is_fatal());

        let err = StreamError::DeviceUnavailable {
            device: "USB Mic".to_string(),
            message: "not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "device unavailable: USB Mic - not found"
        );
        assert!(err.is_device_fault());
    }

    #[test]
    fn test_config_errors_not_fatal() {
        let err = StreamError::invalid_parameter("max_packet_size", "too small");
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "invalid parameter: max_packet_size - too small"
        );
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StreamError>();
    }
}
