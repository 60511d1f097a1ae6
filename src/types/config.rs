use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::DeviceSelector;
use crate::error::{Result, StreamError};
use crate::protocol::rtp::constants::{
    BYTES_PER_SAMPLE, DEFAULT_MAX_PACKET_SIZE, HEADER_SIZE, MAX_PACKET_SIZE,
};

/// Default base port; streams listen on `base_port + identity`
pub const DEFAULT_BASE_PORT: u16 = 35000;

/// Default scheduling tick (20ms)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 20;

/// Default buffered latency before playback starts (100ms at 44.1kHz)
pub const DEFAULT_START_THRESHOLD: usize = 4410;

/// Default cap on datagrams drained per receive tick
pub const DEFAULT_MAX_DATAGRAMS_PER_TICK: usize = 512;

/// Configuration for an outgoing stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Base port shared by all peers (default: 35000)
    pub base_port: u16,

    /// Identity of the receiving peer; selects the destination port
    pub peer_identity: u32,

    /// Destination address (default: IPv4 broadcast)
    pub destination: IpAddr,

    /// Maximum packet size including the 12-byte header (default: 1400)
    pub max_packet_size: usize,

    /// Capture device (default: system default)
    pub device: DeviceSelector,

    /// Capture cycle period in milliseconds (default: 20)
    pub tick_interval_ms: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            base_port: DEFAULT_BASE_PORT,
            peer_identity: 0,
            destination: IpAddr::V4(Ipv4Addr::BROADCAST),
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            device: DeviceSelector::Default,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl SenderConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> SenderConfigBuilder {
        SenderConfigBuilder::default()
    }

    /// Parse a JSON document; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `StreamError::InvalidConfig` if the document is malformed and
    /// `StreamError::InvalidParameter` if a value is out of range.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `StreamError::InvalidParameter` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.max_packet_size < HEADER_SIZE + BYTES_PER_SAMPLE {
            return Err(StreamError::invalid_parameter(
                "max_packet_size",
                format!(
                    "{} bytes leaves no room for a sample after the {HEADER_SIZE}-byte header",
                    self.max_packet_size
                ),
            ));
        }
        if self.max_packet_size > MAX_PACKET_SIZE {
            return Err(StreamError::invalid_parameter(
                "max_packet_size",
                format!(
                    "{} bytes exceeds the {MAX_PACKET_SIZE}-byte UDP payload limit",
                    self.max_packet_size
                ),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(StreamError::invalid_parameter(
                "tick_interval_ms",
                "must be non-zero",
            ));
        }
        Ok(())
    }

    /// Capture cycle period
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Builder for `SenderConfig`
#[derive(Debug, Clone, Default)]
pub struct SenderConfigBuilder {
    config: SenderConfig,
}

impl SenderConfigBuilder {
    /// Set base port
    #[must_use]
    pub fn base_port(mut self, port: u16) -> Self {
        self.config.base_port = port;
        self
    }

    /// Set the receiving peer's identity
    #[must_use]
    pub fn peer_identity(mut self, identity: u32) -> Self {
        self.config.peer_identity = identity;
        self
    }

    /// Set destination address
    #[must_use]
    pub fn destination(mut self, addr: IpAddr) -> Self {
        self.config.destination = addr;
        self
    }

    /// Set maximum packet size in bytes
    #[must_use]
    pub fn max_packet_size(mut self, size: usize) -> Self {
        self.config.max_packet_size = size;
        self
    }

    /// Set capture device
    #[must_use]
    pub fn device(mut self, device: DeviceSelector) -> Self {
        self.config.device = device;
        self
    }

    /// Set capture cycle period
    #[must_use]
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `StreamError::InvalidParameter` if a value is out of range.
    pub fn build(self) -> Result<SenderConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration for an incoming stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Base port shared by all peers (default: 35000)
    pub base_port: u16,

    /// This receiver's identity; selects the listen port
    pub identity: u32,

    /// Local address to bind (default: all interfaces)
    pub bind_address: IpAddr,

    /// Buffered samples required before playback starts (default: 4410)
    pub start_threshold: usize,

    /// Playback device (default: system default)
    pub device: DeviceSelector,

    /// Scheduling tick period in milliseconds (default: 20)
    pub tick_interval_ms: u64,

    /// Datagrams drained per tick at most (default: 512)
    pub max_datagrams_per_tick: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            base_port: DEFAULT_BASE_PORT,
            identity: 0,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            start_threshold: DEFAULT_START_THRESHOLD,
            device: DeviceSelector::Default,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            max_datagrams_per_tick: DEFAULT_MAX_DATAGRAMS_PER_TICK,
        }
    }
}

impl ReceiverConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> ReceiverConfigBuilder {
        ReceiverConfigBuilder::default()
    }

    /// Parse a JSON document; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `StreamError::InvalidConfig` if the document is malformed and
    /// `StreamError::InvalidParameter` if a value is out of range.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `StreamError::InvalidParameter` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(StreamError::invalid_parameter(
                "tick_interval_ms",
                "must be non-zero",
            ));
        }
        if self.max_datagrams_per_tick == 0 {
            return Err(StreamError::invalid_parameter(
                "max_datagrams_per_tick",
                "must be non-zero",
            ));
        }
        Ok(())
    }

    /// Scheduling tick period
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Builder for `ReceiverConfig`
#[derive(Debug, Clone, Default)]
pub struct ReceiverConfigBuilder {
    config: ReceiverConfig,
}

impl ReceiverConfigBuilder {
    /// Set base port
    #[must_use]
    pub fn base_port(mut self, port: u16) -> Self {
        self.config.base_port = port;
        self
    }

    /// Set this receiver's identity
    #[must_use]
    pub fn identity(mut self, identity: u32) -> Self {
        self.config.identity = identity;
        self
    }

    /// Set local bind address
    #[must_use]
    pub fn bind_address(mut self, addr: IpAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set start threshold in samples
    #[must_use]
    pub fn start_threshold(mut self, samples: usize) -> Self {
        self.config.start_threshold = samples;
        self
    }

    /// Set playback device
    #[must_use]
    pub fn device(mut self, device: DeviceSelector) -> Self {
        self.config.device = device;
        self
    }

    /// Set scheduling tick period
    #[must_use]
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the per-tick datagram cap
    #[must_use]
    pub fn max_datagrams_per_tick(mut self, max: usize) -> Self {
        self.config.max_datagrams_per_tick = max;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `StreamError::InvalidParameter` if a value is out of range.
    pub fn build(self) -> Result<ReceiverConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
