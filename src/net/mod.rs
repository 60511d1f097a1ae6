//! Datagram transport
//!
//! Thin connectionless send/receive over UDP plus the identity-to-port rule
//! shared by senders and receivers.

mod transport;


pub use transport::{DatagramTransport, MAX_DATAGRAM_SIZE, UdpTransport, peer_port};
