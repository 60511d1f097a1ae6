//! Audio handling module
//!
//! Sample conversion, the circular reconstruction buffer and the device
//! traits the sender and receiver are written against.

pub mod capture_cpal;
pub mod convert;
pub mod device;
pub mod format;
pub mod output;
pub mod output_cpal;
pub mod ring;
pub mod source;

#[cfg(test)]
mod tests;

#[cfg(feature = "audio-cpal")]
pub use capture_cpal::CpalCapture;
#[cfg(feature = "audio-cpal")]
pub use output_cpal::CpalOutput;
pub use convert::{f32_to_i16, from_be_bytes, i16_to_f32, put_samples_be, to_i16};
pub use device::{DeviceSelector, open_with_fallback};
pub use format::{AudioFormat, CHANNELS, SAMPLE_RATE};
pub use output::{AudioOutputError, OutputState, PlaybackSink};
pub use ring::CircularBuffer;
pub use source::{CaptureError, CaptureSource};
