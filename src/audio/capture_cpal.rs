//! CPAL-based audio capture
//!
//! Opens an f32 mono input stream at 44.1kHz and accumulates samples until
//! the sender pulls them.

#[cfg(feature = "audio-cpal")]
mod implementation {
    use std::sync::{Arc, Mutex};

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    use crate::audio::device::{DeviceSelector, open_with_fallback};
    use crate::audio::format::{AudioFormat, CHANNELS, SAMPLE_RATE};
    use crate::audio::source::{CaptureError, CaptureSource};
    use crate::error::StreamError;

    /// Upper bound on samples held between pulls (2 seconds)
    const MAX_PENDING_SAMPLES: usize = SAMPLE_RATE as usize * 2;

    /// CPAL-based capture source
    pub struct CpalCapture {
        pending: Arc<Mutex<Vec<f32>>>,
        fault: Arc<Mutex<Option<String>>>,
        _stream: cpal::Stream,
    }

    impl CpalCapture {
        /// Open the selected input device, falling back once to the default
        ///
        /// # Errors
        ///
        /// Returns `StreamError::DeviceUnavailable` if no input stream could
        /// be started.
        pub fn open(selector: &DeviceSelector) -> Result<Self, StreamError> {
            open_with_fallback(selector, Self::open_device)
        }

        fn open_device(selector: &DeviceSelector) -> Result<Self, CaptureError> {
            let host = cpal::default_host();
            let device = match selector {
                DeviceSelector::Default => host
                    .default_input_device()
                    .ok_or_else(|| CaptureError::DeviceNotFound("default".to_string()))?,
                DeviceSelector::Named(name) => host
                    .input_devices()
                    .map_err(|e| CaptureError::DeviceError(e.to_string()))?
                    .find(|d| d.name().is_ok_and(|n| &n == name))
                    .ok_or_else(|| CaptureError::DeviceNotFound(name.clone()))?,
            };

            tracing::info!(
                "Opening capture device: {}",
                device.name().unwrap_or_default()
            );

            let config = cpal::StreamConfig {
                channels: CHANNELS,
                sample_rate: cpal::SampleRate(SAMPLE_RATE),
                buffer_size: cpal::BufferSize::Default,
            };

            let pending = Arc::new(Mutex::new(Vec::new()));
            let fault = Arc::new(Mutex::new(None));

            let pending_cb = Arc::clone(&pending);
            let fault_cb = Arc::clone(&fault);

            let stream = device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if let Ok(mut buf) = pending_cb.lock() {
                            buf.extend_from_slice(data);
                            let len = buf.len();
                            if len > MAX_PENDING_SAMPLES {
                                buf.drain(..len - MAX_PENDING_SAMPLES);
                            }
                        }
                    },
                    move |err| {
                        tracing::error!("CPAL input stream error: {}", err);
                        if let Ok(mut slot) = fault_cb.lock() {
                            *slot = Some(err.to_string());
                        }
                    },
                    None,
                )
                .map_err(|e| CaptureError::StreamError(e.to_string()))?;

            stream
                .play()
                .map_err(|e| CaptureError::StreamError(e.to_string()))?;

            Ok(Self {
                pending,
                fault,
                _stream: stream,
            })
        }
    }

    impl CaptureSource for CpalCapture {
        fn format(&self) -> AudioFormat {
            AudioFormat::L16_MONO
        }

        fn pull(&mut self) -> Result<Vec<f32>, CaptureError> {
            let fault = self
                .fault
                .lock()
                .map_err(|_| CaptureError::DeviceError("fault slot poisoned".to_string()))?
                .clone();
            if let Some(message) = fault {
                return Err(CaptureError::StreamError(message));
            }

            let mut pending = self
                .pending
                .lock()
                .map_err(|_| CaptureError::DeviceError("capture buffer poisoned".to_string()))?;
            Ok(std::mem::take(&mut *pending))
        }
    }
}

#[cfg(feature = "audio-cpal")]
pub use implementation::CpalCapture;
