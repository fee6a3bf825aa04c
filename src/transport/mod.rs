//! # Transport
//!
//! Datagram transport used by the MAP client.
//!
//! The exchange layer only hands over and receives opaque buffers; this
//! module owns sockets. Receives are awaited without a local timeout.

pub mod udp;

use crate::error::Result;

/// Send and receive whole datagrams on a connected socket
#[allow(async_fn_in_trait)]
pub trait DatagramTransport {
    /// Send one datagram, returning the number of bytes sent
    async fn send(&self, buf: &[u8]) -> Result<usize>;

    /// Receive one datagram into `buf`, returning its length
    async fn recv(&self, buf: &mut [u8]) -> Result<usize>;
}

pub use udp::UdpTransport;
