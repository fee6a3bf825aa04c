//! # Options
//!
//! Self-delimited extensions appended after the opcode body.
//!
//! ## Wire Format
//! ```text
//! [Code(1)] [Reserved(1)] [Body Length(2)] [Body(N)]
//!
//! THIRD_PARTY    (1): [Internal Address(16)]                                  N = 16
//! PREFER_FAILURE (2): (none)                                                  N = 0
//! FILTER         (3): [Reserved(1)] [Prefix Length(1)] [Peer Port(2)] [Peer Address(16)]  N = 20
//! ```
//!
//! Only the three known options can be built for sending. Decoding accepts
//! any code: options this client does not understand are skipped by their
//! declared length and reported as [`DecodedOption::Unrecognized`].

use serde::Serialize;
use std::net::Ipv6Addr;

use super::cursor::{ByteReader, ByteWriter};
use crate::error::{ProtocolError, Result};

/// Size of the option header in bytes
pub const OPTION_HEADER_SIZE: usize = 4;

pub const OPTION_THIRD_PARTY: u8 = 1;
pub const OPTION_PREFER_FAILURE: u8 = 2;
pub const OPTION_FILTER: u8 = 3;

pub const THIRD_PARTY_BODY_LEN: u16 = 16;
pub const PREFER_FAILURE_BODY_LEN: u16 = 0;
pub const FILTER_BODY_LEN: u16 = 20;

/// An option this client knows how to encode and interpret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PcpOption {
    /// Request made on behalf of another host
    ThirdParty { internal_addr: Ipv6Addr },
    /// Fail instead of mapping to a different external port/address
    PreferFailure,
    /// Restrict inbound traffic to a remote peer prefix
    Filter {
        prefix_length: u8,
        peer_port: u16,
        peer_addr: Ipv6Addr,
    },
}

impl PcpOption {
    pub fn code(&self) -> u8 {
        match self {
            PcpOption::ThirdParty { .. } => OPTION_THIRD_PARTY,
            PcpOption::PreferFailure => OPTION_PREFER_FAILURE,
            PcpOption::Filter { .. } => OPTION_FILTER,
        }
    }

    /// Fixed body length for this variant
    pub fn body_len(&self) -> u16 {
        match self {
            PcpOption::ThirdParty { .. } => THIRD_PARTY_BODY_LEN,
            PcpOption::PreferFailure => PREFER_FAILURE_BODY_LEN,
            PcpOption::Filter { .. } => FILTER_BODY_LEN,
        }
    }

    /// Header plus body
    pub fn encoded_len(&self) -> usize {
        OPTION_HEADER_SIZE + self.body_len() as usize
    }

    pub fn encode(&self, w: &mut ByteWriter<'_>) -> Result<()> {
        w.reserve(self.encoded_len())?;
        w.write_u8(self.code())?;
        w.write_zeros(1)?;
        w.write_u16(self.body_len())?;

        let body_start = w.position();
        match self {
            PcpOption::ThirdParty { internal_addr } => {
                w.write_bytes(&internal_addr.octets())?;
            }
            PcpOption::PreferFailure => {}
            PcpOption::Filter {
                prefix_length,
                peer_port,
                peer_addr,
            } => {
                w.write_zeros(1)?;
                w.write_u8(*prefix_length)?;
                w.write_u16(*peer_port)?;
                w.write_bytes(&peer_addr.octets())?;
            }
        }
        debug_assert_eq!(w.position() - body_start, self.body_len() as usize);
        Ok(())
    }

    /// Parse a known option body whose header has already been read
    fn decode_body(code: u8, length: u16, r: &mut ByteReader<'_>) -> Result<Option<Self>> {
        let expected = match code {
            OPTION_THIRD_PARTY => THIRD_PARTY_BODY_LEN,
            OPTION_PREFER_FAILURE => PREFER_FAILURE_BODY_LEN,
            OPTION_FILTER => FILTER_BODY_LEN,
            _ => return Ok(None),
        };
        if length != expected {
            return Err(ProtocolError::MalformedOption { code, length });
        }

        let option = match code {
            OPTION_THIRD_PARTY => PcpOption::ThirdParty {
                internal_addr: Ipv6Addr::from(r.read_array::<16>()?),
            },
            OPTION_PREFER_FAILURE => PcpOption::PreferFailure,
            _ => {
                r.skip(1)?;
                let prefix_length = r.read_u8()?;
                let peer_port = r.read_u16()?;
                let peer_addr = Ipv6Addr::from(r.read_array::<16>()?);
                PcpOption::Filter {
                    prefix_length,
                    peer_port,
                    peer_addr,
                }
            }
        };
        Ok(Some(option))
    }
}

/// An option as found on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DecodedOption {
    Known(PcpOption),
    /// Skipped without interpretation
    Unrecognized { code: u8, length: u16 },
}

impl DecodedOption {
    /// Decode one option, advancing past it on success.
    ///
    /// On failure the reader is left where it was.
    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self> {
        let mut ahead = r.clone();
        ahead.require(OPTION_HEADER_SIZE)?;
        let code = ahead.read_u8()?;
        ahead.skip(1)?;
        let length = ahead.read_u16()?;

        if length as usize > ahead.remaining() {
            return Err(ProtocolError::OptionOverrun {
                declared: length as usize,
                remaining: ahead.remaining(),
            });
        }

        let decoded = match PcpOption::decode_body(code, length, &mut ahead)? {
            Some(option) => DecodedOption::Known(option),
            None => {
                ahead.skip(length as usize)?;
                DecodedOption::Unrecognized { code, length }
            }
        };
        *r = ahead;
        Ok(decoded)
    }

    /// Re-encode a decoded option.
    ///
    /// Unrecognized options carry no body and are dropped: nothing is
    /// written and the writer position is unchanged.
    pub fn encode(&self, w: &mut ByteWriter<'_>) -> Result<()> {
        match self {
            DecodedOption::Known(option) => option.encode(w),
            DecodedOption::Unrecognized { .. } => Ok(()),
        }
    }

    pub fn known(&self) -> Option<&PcpOption> {
        match self {
            DecodedOption::Known(option) => Some(option),
            DecodedOption::Unrecognized { .. } => None,
        }
    }
}

/// Iterator over the options in the rest of a message.
///
/// Yields each option in order; after the first error it yields that
/// error once and then stops.
pub struct OptionIter<'a> {
    reader: ByteReader<'a>,
    done: bool,
}

impl<'a> OptionIter<'a> {
    pub fn new(reader: ByteReader<'a>) -> Self {
        Self {
            reader,
            done: false,
        }
    }
}

impl Iterator for OptionIter<'_> {
    type Item = Result<DecodedOption>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.reader.is_empty() {
            return None;
        }
        let item = DecodedOption::decode(&mut self.reader);
        self.done = item.is_err();
        Some(item)
    }
}

/// Decode every remaining option, failing on the first malformed one
pub fn decode_options(r: &mut ByteReader<'_>) -> Result<Vec<DecodedOption>> {
    let mut options = Vec::new();
    while !r.is_empty() {
        options.push(DecodedOption::decode(r)?);
    }
    Ok(options)
}
