//! Datagram transport that records sends and replays queued receives

use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::net::DatagramTransport;

#[derive(Debug, Default)]
struct Inner {
    sent: Vec<(Vec<u8>, SocketAddr)>,
    inbound: VecDeque<(Vec<u8>, SocketAddr)>,
    short_send: Option<usize>,
    fail: Option<io::ErrorKind>,
}

/// In-memory transport
///
/// A queued datagram larger than the caller's buffer is an error rather than
/// being cut short. Clones share state, so a test can keep a handle while a stream owns the
/// other.
#[derive(Debug, Clone)]
pub struct MockTransport {
    local: SocketAddr,
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    /// Create a transport reporting `127.0.0.1:local_port`
    #[must_use]
    pub fn new(local_port: u16) -> Self {
        Self {
            local: SocketAddr::from((Ipv4Addr::LOCALHOST, local_port)),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a datagram for `try_recv_from`
    pub fn push_inbound(&self, datagram: impl Into<Vec<u8>>, from: SocketAddr) {
        self.lock().inbound.push_back((datagram.into(), from));
    }

    /// Queue several datagrams from the same peer
    pub fn extend_inbound<I, D>(&self, datagrams: I, from: SocketAddr)
    where
        I: IntoIterator<Item = D>,
        D: Into<Vec<u8>>,
    {
        let mut inner = self.lock();
        for datagram in datagrams {
            inner.inbound.push_back((datagram.into(), from));
        }
    }

    /// Accept at most `limit` bytes per send
    pub fn set_short_send(&self, limit: Option<usize>) {
        self.lock().short_send = limit;
    }

    /// Fail every socket call with `kind`
    pub fn set_failure(&self, kind: Option<io::ErrorKind>) {
        self.lock().fail = kind;
    }

    /// Datagrams sent so far, with their destinations
    #[must_use]
    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.lock().sent.clone()
    }

    /// Payloads sent so far
    #[must_use]
    pub fn sent_datagrams(&self) -> Vec<Vec<u8>> {
        self.lock().sent.iter().map(|(d, _)| d.clone()).collect()
    }

    /// Remove and return everything sent so far
    pub fn take_sent(&self) -> Vec<Vec<u8>> {
        self.lock().sent.drain(..).map(|(d, _)| d).collect()
    }

    /// Datagrams waiting to be received
    #[must_use]
    pub fn pending_inbound(&self) -> usize {
        self.lock().inbound.len()
    }
}

#[async_trait]
impl DatagramTransport for MockTransport {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        let mut inner = self.lock();
        if let Some(kind) = inner.fail {
            return Err(io::Error::new(kind, "simulated send failure"));
        }
        let accepted = inner.short_send.map_or(buf.len(), |limit| buf.len().min(limit));
        inner.sent.push((buf[..accepted].to_vec(), target));
        Ok(accepted)
    }

    fn try_recv_from(&self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>> {
        let mut inner = self.lock();
        if let Some(kind) = inner.fail {
            return Err(io::Error::new(kind, "simulated receive failure"));
        }
        let Some((datagram, from)) = inner.inbound.pop_front() else {
            return Ok(None);
        };
        if datagram.len() > buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{}-byte datagram does not fit a {}-byte receive buffer",
                    datagram.len(),
                    buf.len()
                ),
            ));
        }
        buf[..datagram.len()].copy_from_slice(&datagram);
        Ok(Some((datagram.len(), from)))
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local)
    }
}
