//! Outgoing stream lifecycle: open, tick, run, close

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::packetizer::{Packetizer, SenderState};
use crate::audio::CaptureSource;
use crate::error::{Result, StreamError};
use crate::net::{DatagramTransport, UdpTransport, peer_port};
use crate::types::SenderConfig;

/// Outcome of one capture cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReport {
    /// Samples pulled from the capture source
    pub samples: usize,
    /// Packets sent
    pub packets: usize,
    /// Bytes sent, headers included
    pub bytes: usize,
}

/// Running totals for an outgoing stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderStats {
    /// Capture cycles completed
    pub cycles: u64,
    /// Samples sent
    pub samples_sent: u64,
    /// Packets sent
    pub packets_sent: u64,
    /// Bytes sent, headers included
    pub bytes_sent: u64,
}

/// An outgoing audio stream
///
/// Owns the capture source, the socket and the sender state. One caller
/// drives it with [`SenderStream::tick`] or [`SenderStream::run`].
pub struct SenderStream<C, T = UdpTransport> {
    source: C,
    transport: T,
    packetizer: Packetizer,
    destination: SocketAddr,
    tick_interval: Duration,
    last_cycle: Instant,
    stats: SenderStats,
    failed: bool,
}

impl<C: CaptureSource> SenderStream<C, UdpTransport> {
    /// Open a stream to `destination:base_port + peer_identity`
    ///
    /// Binds an ephemeral broadcast-capable UDP socket.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the capture format
    /// is not L16 mono 44.1kHz, or the socket cannot be bound.
    pub async fn open(config: &SenderConfig, source: C) -> Result<Self> {
        config.validate()?;
        let local = match config.destination {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let transport = UdpTransport::bind_sender(local).await?;
        Self::with_transport(config, source, transport)
    }
}

impl<C: CaptureSource, T: DatagramTransport> SenderStream<C, T> {
    /// Open a stream over an existing transport
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the capture
    /// format is not L16 mono 44.1kHz.
    pub fn with_transport(config: &SenderConfig, source: C, transport: T) -> Result<Self> {
        config.validate()?;

        let format = source.format();
        if !format.is_supported() {
            return Err(StreamError::UnsupportedFormat { format });
        }

        let port = peer_port(config.base_port, config.peer_identity)?;
        let destination = SocketAddr::new(config.destination, port);
        let packetizer = Packetizer::new(config.max_packet_size)?;

        tracing::info!(
            "Sender stream open: destination={}, max_packet_size={}, samples_per_packet={}",
            destination,
            config.max_packet_size,
            packetizer.samples_per_packet()
        );

        Ok(Self {
            source,
            transport,
            packetizer,
            destination,
            tick_interval: config.tick_interval(),
            last_cycle: Instant::now(),
            stats: SenderStats::default(),
            failed: false,
        })
    }

    /// Destination socket address
    #[must_use]
    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Current sequence/timestamp state
    #[must_use]
    pub fn state(&self) -> SenderState {
        self.packetizer.state()
    }

    /// Running totals
    #[must_use]
    pub fn stats(&self) -> SenderStats {
        self.stats
    }

    /// The underlying transport
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one capture cycle
    ///
    /// Pulls everything the source captured since the previous cycle, sends
    /// it as one or more packets, then advances the timestamp by the cycle's
    /// elapsed milliseconds.
    ///
    /// # Errors
    ///
    /// Capture and transport faults are returned and leave the stream torn
    /// down: later calls return `StreamError::Closed`.
    pub async fn tick(&mut self) -> Result<SendReport> {
        if self.failed {
            return Err(StreamError::Closed);
        }

        match self.cycle().await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!("Sender stream to {} failed: {}", self.destination, e);
                self.failed = true;
                Err(e)
            }
        }
    }

    async fn cycle(&mut self) -> Result<SendReport> {
        let samples = self.source.pull()?;
        let packets = self.packetizer.packetize_f32(&samples);

        let mut report = SendReport {
            samples: samples.len(),
            packets: packets.len(),
            bytes: 0,
        };

        for packet in &packets {
            self.send_packet(packet).await?;
            report.bytes += packet.len();
        }

        let now = Instant::now();
        self.packetizer.finish_cycle(now.duration_since(self.last_cycle));
        self.last_cycle = now;

        self.stats.cycles += 1;
        self.stats.samples_sent += report.samples as u64;
        self.stats.packets_sent += report.packets as u64;
        self.stats.bytes_sent += report.bytes as u64;

        if report.packets > 0 {
            tracing::trace!(
                "Sent {} samples in {} packets, next seq={}, timestamp={}",
                report.samples,
                report.packets,
                self.packetizer.sequence(),
                self.packetizer.timestamp()
            );
        }

        Ok(report)
    }

    async fn send_packet(&self, packet: &[u8]) -> Result<()> {
        let sent = self.transport.send_to(packet, self.destination).await?;
        if sent != packet.len() {
            return Err(StreamError::PartialSend {
                sent,
                expected: packet.len(),
            });
        }
        Ok(())
    }

    /// Drive [`SenderStream::tick`] at the configured interval until shutdown
    ///
    /// The loop ends when `shutdown` becomes `true` or its sender is dropped,
    /// and the stream is closed.
    ///
    /// # Errors
    ///
    /// Returns the first tick error; the stream is closed in that case too.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<SenderStats> {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await?;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        Ok(self.close())
    }

    /// Tear down the stream, releasing the socket and capture source
    pub fn close(self) -> SenderStats {
        tracing::info!(
            "Sender stream to {} closed: {} packets, {} samples",
            self.destination,
            self.stats.packets_sent,
            self.stats.samples_sent
        );
        self.stats
    }
}
