//! Fixed-capacity circular sample buffer
//!
//! Unlike a FIFO ring, this buffer has no read/write pointers of its own.
//! Writers address it by absolute offset and it wraps at the end; whoever
//! owns the buffer decides what is stale.

/// Circular buffer of normalized samples
#[derive(Debug, Clone)]
pub struct CircularBuffer {
    data: Vec<f32>,
}

impl CircularBuffer {
    /// Create a silent buffer of `capacity` samples
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "circular buffer capacity must be non-zero");
        Self {
            data: vec![0.0; capacity],
        }
    }

    /// Buffer capacity in samples
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Write `samples` starting at `offset`, wrapping across the end
    ///
    /// `offset` is reduced modulo capacity. Runs longer than the buffer keep
    /// wrapping, so only the last `capacity` samples survive. Returns the
    /// offset following the last written sample.
    pub fn write_at(&mut self, offset: usize, samples: &[f32]) -> usize {
        let capacity = self.capacity();
        let mut pos = offset % capacity;
        let mut remaining = samples;

        while !remaining.is_empty() {
            let chunk = (capacity - pos).min(remaining.len());
            self.data[pos..pos + chunk].copy_from_slice(&remaining[..chunk]);
            remaining = &remaining[chunk..];
            pos = (pos + chunk) % capacity;
        }

        pos
    }

    /// Copy samples starting at `offset` into `output`, wrapping across the end
    pub fn read_at(&self, offset: usize, output: &mut [f32]) {
        let capacity = self.capacity();
        let mut pos = offset % capacity;
        let mut filled = 0;

        while filled < output.len() {
            let chunk = (capacity - pos).min(output.len() - filled);
            output[filled..filled + chunk].copy_from_slice(&self.data[pos..pos + chunk]);
            filled += chunk;
            pos = (pos + chunk) % capacity;
        }
    }

    /// Raw contents in storage order
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Reset every sample to silence
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}
