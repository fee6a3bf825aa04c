//! # Opcode Bodies
//!
//! The opcode-specific part of a message, directly after the header.
//! MAP uses [`MapInfo`] in both directions; PEER uses [`PeerInfo`].
//!
//! ## Wire Format
//! ```text
//! MapInfo:  [Nonce(12)] [Protocol(1)] [Reserved(3)] [Internal Port(2)] [External Port(2)] [External Address(16)]
//! PeerInfo: [MapInfo(36)] [Peer Port(2)] [Reserved(2)] [Peer Address(16)]
//! ```

use serde::{Serialize, Serializer};
use std::fmt;
use std::net::Ipv6Addr;

use super::cursor::{ByteReader, ByteWriter};
use super::WireFormat;
use crate::error::Result;

/// Size of a mapping nonce in bytes
pub const NONCE_SIZE: usize = 12;

/// Mapping nonce correlating a request with its response.
///
/// Generated fresh for each request and echoed unchanged by the gateway.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    pub const fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({self})")
    }
}

impl Serialize for Nonce {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// MAP opcode body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapInfo {
    pub nonce: Nonce,
    /// IANA protocol number (6 = TCP, 17 = UDP)
    pub protocol: u8,
    pub internal_port: u16,
    pub external_port: u16,
    /// Suggested on a request, assigned on a response
    pub external_addr: Ipv6Addr,
}

impl WireFormat for MapInfo {
    const SIZE: usize = 36;

    fn encode(&self, w: &mut ByteWriter<'_>) -> Result<()> {
        w.reserve(Self::SIZE)?;
        w.write_bytes(self.nonce.as_bytes())?;
        w.write_u8(self.protocol)?;
        w.write_zeros(3)?;
        w.write_u16(self.internal_port)?;
        w.write_u16(self.external_port)?;
        w.write_bytes(&self.external_addr.octets())?;
        Ok(())
    }

    fn decode(r: &mut ByteReader<'_>) -> Result<Self> {
        r.require(Self::SIZE)?;
        let nonce = Nonce::from_bytes(r.read_array()?);
        let protocol = r.read_u8()?;
        r.skip(3)?;
        let internal_port = r.read_u16()?;
        let external_port = r.read_u16()?;
        let external_addr = Ipv6Addr::from(r.read_array::<16>()?);
        Ok(Self {
            nonce,
            protocol,
            internal_port,
            external_port,
            external_addr,
        })
    }
}

/// PEER opcode body: a MAP body plus the remote peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerInfo {
    pub map: MapInfo,
    pub peer_port: u16,
    pub peer_addr: Ipv6Addr,
}

impl WireFormat for PeerInfo {
    const SIZE: usize = 56;

    fn encode(&self, w: &mut ByteWriter<'_>) -> Result<()> {
        w.reserve(Self::SIZE)?;
        self.map.encode(w)?;
        w.write_u16(self.peer_port)?;
        w.write_zeros(2)?;
        w.write_bytes(&self.peer_addr.octets())?;
        Ok(())
    }

    fn decode(r: &mut ByteReader<'_>) -> Result<Self> {
        r.require(Self::SIZE)?;
        let map = MapInfo::decode(r)?;
        let peer_port = r.read_u16()?;
        r.skip(2)?;
        let peer_addr = Ipv6Addr::from(r.read_array::<16>()?);
        Ok(Self {
            map,
            peer_port,
            peer_addr,
        })
    }
}
