//! CPAL-based audio output
//!
//! The output stream runs for the lifetime of the sink. While stopped it
//! renders silence and the read cursor holds still; while playing it reads
//! from the circular buffer and advances the cursor, wrapping at capacity.

#[cfg(feature = "audio-cpal")]
mod implementation {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    use crate::audio::device::{DeviceSelector, open_with_fallback};
    use crate::audio::format::{CHANNELS, SAMPLE_RATE};
    use crate::audio::output::{AudioOutputError, OutputState, PlaybackSink};
    use crate::audio::ring::CircularBuffer;
    use crate::error::StreamError;

    struct Shared {
        buffer: Mutex<CircularBuffer>,
        cursor: AtomicUsize,
        playing: AtomicBool,
        fault: Mutex<Option<String>>,
    }

    /// CPAL-based playback sink
    pub struct CpalOutput {
        shared: Arc<Shared>,
        capacity: usize,
        _stream: cpal::Stream,
    }

    impl CpalOutput {
        /// Open the selected output device, falling back once to the default
        ///
        /// # Errors
        ///
        /// Returns `StreamError::DeviceUnavailable` if no output stream could
        /// be started.
        pub fn open(selector: &DeviceSelector, capacity: usize) -> Result<Self, StreamError> {
            if capacity == 0 {
                return Err(StreamError::InvalidParameter {
                    name: "capacity".to_string(),
                    message: "playback buffer capacity must be non-zero".to_string(),
                });
            }
            open_with_fallback(selector, |s| Self::open_device(s, capacity))
        }

        fn open_device(
            selector: &DeviceSelector,
            capacity: usize,
        ) -> Result<Self, AudioOutputError> {
            let host = cpal::default_host();
            let device = match selector {
                DeviceSelector::Default => host
                    .default_output_device()
                    .ok_or_else(|| AudioOutputError::DeviceNotFound("default".to_string()))?,
                DeviceSelector::Named(name) => host
                    .output_devices()
                    .map_err(|e| AudioOutputError::DeviceError(e.to_string()))?
                    .find(|d| d.name().is_ok_and(|n| &n == name))
                    .ok_or_else(|| AudioOutputError::DeviceNotFound(name.clone()))?,
            };

            tracing::info!(
                "Opening output device: {} ({} sample buffer)",
                device.name().unwrap_or_default(),
                capacity
            );

            let config = cpal::StreamConfig {
                channels: CHANNELS,
                sample_rate: cpal::SampleRate(SAMPLE_RATE),
                buffer_size: cpal::BufferSize::Default,
            };

            let shared = Arc::new(Shared {
                buffer: Mutex::new(CircularBuffer::new(capacity)),
                cursor: AtomicUsize::new(0),
                playing: AtomicBool::new(false),
                fault: Mutex::new(None),
            });

            let render = Arc::clone(&shared);
            let errors = Arc::clone(&shared);

            let stream = device
                .build_output_stream(
                    &config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        if !render.playing.load(Ordering::Acquire) {
                            data.fill(0.0);
                            return;
                        }
                        let cursor = render.cursor.load(Ordering::Acquire);
                        match render.buffer.lock() {
                            Ok(buffer) => buffer.read_at(cursor, data),
                            Err(_) => data.fill(0.0),
                        }
                        render
                            .cursor
                            .store((cursor + data.len()) % capacity, Ordering::Release);
                    },
                    move |err| {
                        tracing::error!("CPAL output stream error: {}", err);
                        if let Ok(mut slot) = errors.fault.lock() {
                            *slot = Some(err.to_string());
                        }
                    },
                    None,
                )
                .map_err(|e| AudioOutputError::StreamError(e.to_string()))?;

            stream
                .play()
                .map_err(|e| AudioOutputError::StreamError(e.to_string()))?;

            Ok(Self {
                shared,
                capacity,
                _stream: stream,
            })
        }

        fn check_fault(&self) -> Result<(), AudioOutputError> {
            let fault = self
                .shared
                .fault
                .lock()
                .map_err(|_| AudioOutputError::DeviceError("fault slot poisoned".to_string()))?;
            match fault.as_ref() {
                Some(message) => Err(AudioOutputError::StreamError(message.clone())),
                None => Ok(()),
            }
        }
    }

    impl PlaybackSink for CpalOutput {
        fn capacity(&self) -> usize {
            self.capacity
        }

        fn write(&mut self, offset: usize, samples: &[f32]) -> Result<(), AudioOutputError> {
            self.check_fault()?;
            if offset + samples.len() > self.capacity {
                return Err(AudioOutputError::OffsetOutOfRange {
                    offset,
                    capacity: self.capacity,
                });
            }
            let mut buffer = self
                .shared
                .buffer
                .lock()
                .map_err(|_| AudioOutputError::DeviceError("output buffer poisoned".to_string()))?;
            buffer.write_at(offset, samples);
            Ok(())
        }

        fn cursor(&self) -> usize {
            self.shared.cursor.load(Ordering::Acquire)
        }

        fn play(&mut self) -> Result<(), AudioOutputError> {
            self.check_fault()?;
            self.shared.playing.store(true, Ordering::Release);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AudioOutputError> {
            self.shared.playing.store(false, Ordering::Release);
            Ok(())
        }

        fn state(&self) -> OutputState {
            if self.shared.playing.load(Ordering::Acquire) {
                OutputState::Playing
            } else {
                OutputState::Stopped
            }
        }
    }
}

#[cfg(feature = "audio-cpal")]
pub use implementation::CpalOutput;
