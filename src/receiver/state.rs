//! Per-stream receive path: validate, track, depacketize, schedule

use super::depacketizer::Depacketizer;
use super::scheduler::{PlaybackDecision, PlaybackScheduler};
use super::sequence_tracker::{SequenceStats, SequenceTracker, SequenceVerdict};
use crate::audio::output::{AudioOutputError, PlaybackSink};
use crate::protocol::rtp::{RtpDecodeError, RtpPacket};

/// What happened to one datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Accepted and written to the device buffer
    Written {
        /// Verdict from the sequence tracker
        verdict: SequenceVerdict,
        /// Samples written
        samples: usize,
    },
    /// Dropped as late or stale
    Discarded {
        /// Sequence number of the dropped packet
        sequence: u16,
    },
    /// Too short for an RTP header, or not RTP version 2
    Malformed,
    /// RTP with a payload type other than L16 mono
    Foreign,
}

impl IngestOutcome {
    /// Whether samples reached the device buffer
    #[must_use]
    pub fn is_written(self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Running totals for an incoming stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Datagrams read from the socket
    pub datagrams: u64,
    /// Datagrams that failed header validation
    pub malformed: u64,
    /// Datagrams carrying another payload type
    pub foreign: u64,
    /// Samples written to the device buffer
    pub samples_written: u64,
    /// Times playback was started
    pub playback_starts: u64,
    /// Times playback was stopped on underrun
    pub underruns: u64,
    /// Sequence tracking totals
    pub sequence: SequenceStats,
}

/// Receiver stream state
///
/// Exactly one caller owns it and feeds it datagrams and scheduling ticks.
#[derive(Debug, Clone)]
pub struct ReceiverState {
    tracker: SequenceTracker,
    depacketizer: Depacketizer,
    scheduler: PlaybackScheduler,
    datagrams: u64,
    malformed: u64,
    foreign: u64,
}

impl ReceiverState {
    /// Create state for a device buffer of `capacity` samples
    #[must_use]
    pub fn new(capacity: usize, start_threshold: usize) -> Self {
        Self {
            tracker: SequenceTracker::new(),
            depacketizer: Depacketizer::new(),
            scheduler: PlaybackScheduler::new(capacity, start_threshold),
            datagrams: 0,
            malformed: 0,
            foreign: 0,
        }
    }

    /// Process one received datagram
    ///
    /// Malformed and foreign traffic is counted and dropped, never returned
    /// as an error.
    ///
    /// # Errors
    ///
    /// Returns `AudioOutputError` if the device rejected a write.
    pub fn ingest<S: PlaybackSink + ?Sized>(
        &mut self,
        datagram: &[u8],
        sink: &mut S,
    ) -> Result<IngestOutcome, AudioOutputError> {
        self.datagrams += 1;

        let packet = match RtpPacket::decode(datagram) {
            Ok(packet) => packet,
            Err(e) => return Ok(self.reject(&e)),
        };

        let sequence = packet.header.sequence;
        let verdict = self.tracker.observe(sequence);
        if !verdict.is_accepted() {
            return Ok(IngestOutcome::Discarded { sequence });
        }

        let samples = self.depacketizer.write(&packet.payload, sink)?;
        tracing::trace!(
            "Wrote {} samples from seq={} (write_position={})",
            samples,
            sequence,
            self.depacketizer.write_position()
        );

        Ok(IngestOutcome::Written { verdict, samples })
    }

    fn reject(&mut self, error: &RtpDecodeError) -> IngestOutcome {
        tracing::trace!("Dropping datagram: {}", error);
        if error.is_foreign() {
            self.foreign += 1;
            IngestOutcome::Foreign
        } else {
            self.malformed += 1;
            IngestOutcome::Malformed
        }
    }

    /// Run one scheduling decision against the device
    ///
    /// # Errors
    ///
    /// Returns `AudioOutputError` if the device failed to start or stop.
    pub fn schedule<S: PlaybackSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<PlaybackDecision, AudioOutputError> {
        let decision = self
            .scheduler
            .tick(sink.cursor(), self.depacketizer.write_position());

        match decision {
            PlaybackDecision::Start => sink.play()?,
            PlaybackDecision::Stop => {
                tracing::warn!(
                    "Playback underrun at read position {}",
                    self.scheduler.read_position()
                );
                sink.stop()?;
            }
            PlaybackDecision::Hold => {}
        }

        Ok(decision)
    }

    /// Absolute write position in samples
    #[must_use]
    pub fn write_position(&self) -> u64 {
        self.depacketizer.write_position()
    }

    /// Absolute read position as of the last scheduling tick
    #[must_use]
    pub fn read_position(&self) -> u64 {
        self.scheduler.read_position()
    }

    /// The sequence tracker
    #[must_use]
    pub fn tracker(&self) -> &SequenceTracker {
        &self.tracker
    }

    /// The playback scheduler
    #[must_use]
    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    /// Running totals
    #[must_use]
    pub fn stats(&self) -> ReceiverStats {
        ReceiverStats {
            datagrams: self.datagrams,
            malformed: self.malformed,
            foreign: self.foreign,
            samples_written: self.depacketizer.write_position(),
            playback_starts: self.scheduler.starts(),
            underruns: self.scheduler.underruns(),
            sequence: self.tracker.stats(),
        }
    }
}
