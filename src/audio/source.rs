//! Capture source abstraction

use crate::audio::format::AudioFormat;

/// Errors from audio capture
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Device not found
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Stream error
    #[error("Stream error: {0}")]
    StreamError(String),

    /// Generic device error
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Source closed
    #[error("Capture closed")]
    Closed,
}

/// Pull source of newly captured audio
///
/// Implementations buffer whatever the device produced since the previous
/// pull and hand it over as one contiguous run.
pub trait CaptureSource {
    /// Format of the samples this source yields
    fn format(&self) -> AudioFormat;

    /// Take all samples captured since the last call
    ///
    /// Samples are normalized to [-1, 1]. Returns an empty run when nothing
    /// new is available.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError` if the device failed.
    fn pull(&mut self) -> Result<Vec<f32>, CaptureError>;
}

impl<T: CaptureSource + ?Sized> CaptureSource for Box<T> {
    fn format(&self) -> AudioFormat {
        (**self).format()
    }

    fn pull(&mut self) -> Result<Vec<f32>, CaptureError> {
        (**self).pull()
    }
}
