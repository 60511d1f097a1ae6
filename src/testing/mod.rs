//! In-memory collaborators for exercising streams without devices or sockets

pub mod memory_sink;
pub mod mock_transport;
pub mod network_sim;
pub mod scripted_source;

#[cfg(test)]
mod tests;

pub use memory_sink::MemorySink;
pub use mock_transport::MockTransport;
pub use network_sim::NetworkSimulator;
pub use scripted_source::ScriptedSource;

/// A sine tone in `[-amplitude, amplitude]` at 44.1kHz, starting at phase 0
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sine_wave(frequency: f32, amplitude: f32, samples: usize) -> Vec<f32> {
    let step = std::f32::consts::TAU * frequency / crate::audio::SAMPLE_RATE as f32;
    (0..samples)
        .map(|i| amplitude * (step * i as f32).sin())
        .collect()
}
