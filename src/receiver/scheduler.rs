//! Hysteresis-based playback start/stop control

/// What the scheduler wants the playback device to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackDecision {
    /// Enough audio is buffered; start playing
    Start,
    /// The reader caught up with the writer; stop playing
    Stop,
    /// Leave the device as it is
    Hold,
}

/// Playback scheduler for one incoming stream
///
/// The device reports a cursor inside its circular buffer. A cursor lower
/// than the previous report means the device completed a lap, so the
/// absolute read position is `loop_count * capacity + cursor`.
///
/// Playback starts once more than `start_threshold` samples are buffered and
/// stops only when the reader reaches the writer; the gap between the two
/// conditions keeps the device from flapping.
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    capacity: u64,
    start_threshold: u64,
    previous_cursor: u64,
    loop_count: u64,
    read_position: u64,
    playing: bool,
    starts: u64,
    underruns: u64,
}

impl PlaybackScheduler {
    /// Create a scheduler for a device buffer of `capacity` samples
    #[must_use]
    pub fn new(capacity: usize, start_threshold: usize) -> Self {
        Self {
            capacity: capacity as u64,
            start_threshold: start_threshold as u64,
            previous_cursor: 0,
            loop_count: 0,
            read_position: 0,
            playing: false,
            starts: 0,
            underruns: 0,
        }
    }

    /// Fold a new cursor report into the absolute read position
    pub fn update_read_position(&mut self, cursor: usize) -> u64 {
        let cursor = cursor as u64;
        if cursor < self.previous_cursor {
            self.loop_count += 1;
        }
        self.previous_cursor = cursor;
        self.read_position = self.loop_count * self.capacity + cursor;
        self.read_position
    }

    /// Decide whether playback should start or stop
    pub fn tick(&mut self, cursor: usize, write_position: u64) -> PlaybackDecision {
        let read_position = self.update_read_position(cursor);

        if self.playing && read_position >= write_position {
            self.playing = false;
            self.underruns += 1;
            tracing::debug!(
                "Playback underrun: read={} write={}",
                read_position,
                write_position
            );
            return PlaybackDecision::Stop;
        }

        if !self.playing && write_position.saturating_sub(read_position) > self.start_threshold {
            self.playing = true;
            self.starts += 1;
            tracing::debug!(
                "Playback start: read={} write={} buffered={}",
                read_position,
                write_position,
                write_position - read_position
            );
            return PlaybackDecision::Start;
        }

        PlaybackDecision::Hold
    }

    /// Whether the scheduler believes the device is playing
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Absolute read position as of the last tick
    #[must_use]
    pub fn read_position(&self) -> u64 {
        self.read_position
    }

    /// Completed laps of the device buffer
    #[must_use]
    pub fn loop_count(&self) -> u64 {
        self.loop_count
    }

    /// Samples between the reader and `write_position`
    #[must_use]
    pub fn buffered(&self, write_position: u64) -> u64 {
        write_position.saturating_sub(self.read_position)
    }

    /// Times playback was started
    #[must_use]
    pub fn starts(&self) -> u64 {
        self.starts
    }

    /// Times playback was stopped on underrun
    #[must_use]
    pub fn underruns(&self) -> u64 {
        self.underruns
    }
}
