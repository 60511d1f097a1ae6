//! Sample conversion between normalized floats and wire PCM
//!
//! Floats are scaled by 32767 in both directions. Encoding truncates toward
//! zero after clamping to [-1, 1]; the wire byte order is big-endian.

use bytes::BufMut;

/// Full-scale magnitude used for normalization
pub const FULL_SCALE: f32 = 32767.0;

/// Convert one normalized sample to signed 16-bit PCM
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * FULL_SCALE) as i16
}

/// Convert one signed 16-bit PCM sample to a normalized float
#[must_use]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / FULL_SCALE
}

/// Convert a run of normalized samples to signed 16-bit PCM
#[must_use]
pub fn to_i16(input: &[f32]) -> Vec<i16> {
    input.iter().copied().map(f32_to_i16).collect()
}

/// Append samples to `out` as big-endian bytes
pub fn put_samples_be<B: BufMut>(out: &mut B, samples: &[i16]) {
    for &sample in samples {
        out.put_i16(sample);
    }
}

/// Decode a big-endian PCM payload into normalized samples
///
/// A trailing odd byte is ignored.
#[must_use]
pub fn from_be_bytes(payload: &[u8]) -> Vec<f32> {
    payload
        .chunks_exact(2)
        .map(|bytes| i16_to_f32(i16::from_be_bytes([bytes[0], bytes[1]])))
        .collect()
}
