//! Capture source replaying prepared sample runs

use std::collections::VecDeque;

use crate::audio::{AudioFormat, CaptureError, CaptureSource};

/// Capture source that yields one queued run per pull
///
/// An empty queue yields an empty run, like a device with nothing new.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    runs: VecDeque<Vec<f32>>,
    format: AudioFormat,
    fail_next: bool,
}

impl ScriptedSource {
    /// Create a source that replays `runs` in order
    pub fn new(runs: impl IntoIterator<Item = Vec<f32>>) -> Self {
        Self {
            runs: runs.into_iter().collect(),
            format: AudioFormat::L16_MONO,
            fail_next: false,
        }
    }

    /// Report a different capture format
    #[must_use]
    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    /// Queue another run
    pub fn push(&mut self, run: Vec<f32>) {
        self.runs.push_back(run);
    }

    /// Make the next pull fail as a disconnected device
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    /// Runs not yet pulled
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.runs.len()
    }
}

impl CaptureSource for ScriptedSource {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn pull(&mut self) -> Result<Vec<f32>, CaptureError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(CaptureError::DeviceError("device disconnected".to_string()));
        }
        Ok(self.runs.pop_front().unwrap_or_default())
    }
}
