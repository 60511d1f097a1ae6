use std::io;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use tokio::net::UdpSocket;

use crate::error::{Result, StreamError};

/// Largest UDP payload; the receive buffer holds any datagram whole
pub const MAX_DATAGRAM_SIZE: usize = 65535;

/// Derive the UDP port for a peer: `base_port + (identity mod 65536)`
///
/// # Errors
///
/// Returns `StreamError::InvalidParameter` if the sum leaves the port range.
pub fn peer_port(base_port: u16, identity: u32) -> Result<u16> {
    #[allow(clippy::cast_possible_truncation)]
    let offset = (identity & 0xFFFF) as u16;
    base_port.checked_add(offset).ok_or_else(|| {
        StreamError::invalid_parameter(
            "identity",
            format!("port {base_port} + {offset} exceeds 65535"),
        )
    })
}

/// Connectionless datagram transport
#[async_trait]
pub trait DatagramTransport: Send + Sync {
    /// Send one datagram, returning the number of bytes the socket accepted
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize>;

    /// Receive one datagram without waiting
    ///
    /// Returns `Ok(None)` when nothing is queued.
    fn try_recv_from(&self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>>;

    /// Local socket address
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// UDP transport over a tokio socket
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind an ephemeral port for sending, with broadcast enabled
    ///
    /// # Errors
    ///
    /// Returns the socket error if binding fails.
    pub async fn bind_sender(local: IpAddr) -> Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::new(local, 0)).await?;
        socket.set_broadcast(true)?;
        tracing::debug!("Sender socket bound to {}", socket.local_addr()?);
        Ok(Self { socket })
    }

    /// Bind `base_port + identity` for receiving
    ///
    /// # Errors
    ///
    /// Returns an error if the port is out of range or binding fails.
    pub async fn bind_receiver(local: IpAddr, base_port: u16, identity: u32) -> Result<Self> {
        let port = peer_port(base_port, identity)?;
        let socket = UdpSocket::bind(SocketAddr::new(local, port)).await?;
        tracing::debug!("Receiver socket bound to {}", socket.local_addr()?);
        Ok(Self { socket })
    }

    /// Wrap an already bound socket
    #[must_use]
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self { socket }
    }
}

#[async_trait]
impl DatagramTransport for UdpTransport {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(buf, target).await
    }

    fn try_recv_from(&self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>> {
        match self.socket.try_recv_from(buf) {
            Ok(received) => Ok(Some(received)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}
