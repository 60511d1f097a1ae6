//! RTP sequence number tracking with wrap-around and resync

/// Consecutive late packets tolerated before forcing a resync
pub const DISORDER_THRESHOLD: u32 = 5;

const TOP_BIT: u16 = 0x8000;

/// Classification of an arriving sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceVerdict {
    /// Next in order
    InOrder,
    /// Repeat of the last accepted number; accepted and written again
    Duplicate,
    /// Accepted after skipping `missing` sequence numbers
    Gap {
        /// Sequence numbers skipped
        missing: u16,
    },
    /// Accepted as a 16-bit wrap-around
    WrapAround,
    /// Accepted after sustained disorder; tracking restarts here
    Resync,
    /// Late or stale, dropped
    Discarded,
}

impl SequenceVerdict {
    /// Whether the packet should be depacketized
    #[must_use]
    pub fn is_accepted(self) -> bool {
        !matches!(self, Self::Discarded)
    }
}

/// Tracks the last accepted RTP sequence number
///
/// Acceptance rules, in order:
/// 1. `seq` with the top bit clear after a `last` with the top bit set is a
///    wrap-around and is accepted.
/// 2. `seq < last` is late; it is discarded unless this is the
///    `DISORDER_THRESHOLD + 1`-th late packet in a row, which forces a resync.
/// 3. Anything else is accepted; forward gaps are tolerated and a repeat of
///    `last` is reported as a duplicate.
#[derive(Debug, Clone)]
pub struct SequenceTracker {
    /// Last accepted sequence number
    last: Option<u16>,
    /// Late packets seen since the last acceptance
    disorder_count: u32,
    /// Late packets tolerated before a resync
    threshold: u32,
    stats: SequenceStats,
}

impl SequenceTracker {
    /// Create a new sequence tracker
    #[must_use]
    pub fn new() -> Self {
        Self::with_threshold(DISORDER_THRESHOLD)
    }

    /// Create a tracker with a custom disorder threshold
    #[must_use]
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            last: None,
            disorder_count: 0,
            threshold,
            stats: SequenceStats::default(),
        }
    }

    /// Classify `seq` and update the tracking state
    pub fn observe(&mut self, seq: u16) -> SequenceVerdict {
        let Some(last) = self.last else {
            self.accept(seq);
            return SequenceVerdict::InOrder;
        };

        if seq & TOP_BIT == 0 && last & TOP_BIT != 0 {
            self.accept(seq);
            self.stats.wraps += 1;
            tracing::trace!("Sequence wrapped: {} -> {}", last, seq);
            return SequenceVerdict::WrapAround;
        }

        if seq < last {
            self.disorder_count += 1;
            if self.disorder_count > self.threshold {
                tracing::warn!(
                    "Sequence resync after {} late packets: {} -> {}",
                    self.disorder_count,
                    last,
                    seq
                );
                self.accept(seq);
                self.stats.resyncs += 1;
                return SequenceVerdict::Resync;
            }
            self.stats.discarded += 1;
            tracing::trace!("Discarding late packet {} (last={})", seq, last);
            return SequenceVerdict::Discarded;
        }

        if seq == last {
            self.accept(seq);
            self.stats.duplicates += 1;
            tracing::trace!("Duplicate of last accepted packet {}", seq);
            return SequenceVerdict::Duplicate;
        }

        let missing = seq - last - 1;
        self.accept(seq);

        if missing > 0 {
            self.stats.gaps += 1;
            self.stats.lost += u64::from(missing);
            tracing::trace!("Sequence gap: {} packets missing before {}", missing, seq);
            SequenceVerdict::Gap { missing }
        } else {
            SequenceVerdict::InOrder
        }
    }

    /// Record a packet, returning whether it should be depacketized
    pub fn accept_packet(&mut self, seq: u16) -> bool {
        self.observe(seq).is_accepted()
    }

    fn accept(&mut self, seq: u16) {
        self.last = Some(seq);
        self.disorder_count = 0;
        self.stats.accepted += 1;
    }

    /// Last accepted sequence number
    #[must_use]
    pub fn last(&self) -> Option<u16> {
        self.last
    }

    /// Late packets seen since the last acceptance
    #[must_use]
    pub fn disorder_count(&self) -> u32 {
        self.disorder_count
    }

    /// Get statistics
    #[must_use]
    pub fn stats(&self) -> SequenceStats {
        self.stats
    }

    /// Forget all state, as for a new stream
    pub fn reset(&mut self) {
        self.last = None;
        self.disorder_count = 0;
        self.stats = SequenceStats::default();
    }
}

impl Default for SequenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for sequence tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceStats {
    /// Packets accepted (including wraps and resyncs)
    pub accepted: u64,
    /// Late packets dropped
    pub discarded: u64,
    /// Forced resynchronizations
    pub resyncs: u64,
    /// Wrap-arounds accepted
    pub wraps: u64,
    /// Repeats of the last accepted number (written twice)
    pub duplicates: u64,
    /// Forward gaps seen
    pub gaps: u64,
    /// Sequence numbers skipped by forward gaps
    pub lost: u64,
}

impl SequenceStats {
    /// Fraction of expected packets that never arrived (0.0 to 1.0)
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "Precision loss acceptable for ratio calculation"
    )]
    pub fn loss_ratio(&self) -> f64 {
        let total = self.accepted + self.lost;
        if total == 0 {
            return 0.0;
        }
        self.lost as f64 / total as f64
    }
}
