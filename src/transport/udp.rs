//! UDP transport bound to a local address and connected to one gateway

use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, instrument};

use super::DatagramTransport;
use crate::error::{ProtocolError, Result};

/// Connected UDP socket
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind `local` and connect to `server`.
    ///
    /// Both addresses must be of the same family.
    #[instrument]
    pub async fn connect(local: SocketAddr, server: SocketAddr) -> Result<Self> {
        if local.is_ipv4() != server.is_ipv4() {
            return Err(ProtocolError::AddressFamilyMismatch);
        }

        let socket = UdpSocket::bind(local).await.map_err(|e| {
            ProtocolError::TransportError(format!("Failed to bind local address {local}: {e}"))
        })?;
        socket.connect(server).await.map_err(|e| {
            ProtocolError::TransportError(format!("Failed to connect to {server}: {e}"))
        })?;

        debug!(local = %socket.local_addr()?, %server, "UDP transport ready");
        Ok(Self { socket })
    }

    /// Wrap an already connected socket
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self { socket }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl DatagramTransport for UdpTransport {
    async fn send(&self, buf: &[u8]) -> Result<usize> {
        Ok(self.socket.send(buf).await?)
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.socket.recv(buf).await?)
    }
}
