//! Receive path for an incoming audio stream
//!
//! Datagrams flow through the [`SequenceTracker`], the [`Depacketizer`] and
//! into the playback device's circular buffer. Once per tick the
//! [`PlaybackScheduler`] compares the absolute read and write positions and
//! starts or stops the device.

mod depacketizer;
mod scheduler;
mod sequence_tracker;
mod state;
mod stream;

#[cfg(test)]
mod tests;

pub use depacketizer::Depacketizer;
pub use scheduler::{PlaybackDecision, PlaybackScheduler};
pub use sequence_tracker::{DISORDER_THRESHOLD, SequenceStats, SequenceTracker, SequenceVerdict};
pub use state::{IngestOutcome, ReceiverState, ReceiverStats};
pub use stream::{ReceiveReport, ReceiverStream};
