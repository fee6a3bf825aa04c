//! # MAP Exchange
//!
//! Builds a MAP request and validates the gateway's response.
//!
//! Neither step performs I/O: [`Exchange::build_map_request`] fills a
//! buffer and [`validate_map_response`] inspects one. The transport in
//! between belongs to the caller (see `service::client`).
//!
//! ## Response Gate
//! A response is accepted only if it passes, in order:
//! 1. size within `[24, 1100]` and a multiple of 4
//! 2. version equals [`PCP_VERSION`]
//! 3. the response bit is set
//! 4. the result code is not `UNSUPP_VERSION`
//! 5. the echoed opcode is MAP
//! 6. the result code is `SUCCESS`
//! 7. a complete MAP body follows the header
//! 8. the body's nonce equals the request nonce
//!
//! The first failing check decides the error.

use bytes::Bytes;
use serde::Serialize;
use std::net::IpAddr;
use tracing::{info, warn};

use super::entropy::EntropySource;
use crate::config::{ClientConfig, MAX_PAYLOAD_SIZE, PCP_VERSION};
use crate::core::address::{fixed_size_addr, suggested_external_addr, to_ip_addr};
use crate::core::body::{MapInfo, Nonce};
use crate::core::cursor::{ByteReader, ByteWriter};
use crate::core::header::{OpCode, RequestHeader, ResponseHeader, ResultCode};
use crate::core::option::{DecodedOption, OptionIter, PcpOption};
use crate::core::WireFormat;
use crate::error::{ProtocolError, Result};

/// Caller-supplied parameters of one MAP request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapParams {
    /// Address the client sends from
    pub client_addr: IpAddr,
    /// IANA protocol number of the mapping
    pub protocol: u8,
    /// Internal port, also suggested as the external port
    pub port: u16,
    /// Lifetime requested from the gateway, in seconds
    pub requested_lifetime: u32,
    /// Append PREFER_FAILURE
    pub prefer_failure: bool,
}

impl MapParams {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client_addr: config.local_socket_addr()?.ip(),
            protocol: config.protocol.number(),
            port: config.port,
            requested_lifetime: config.requested_lifetime,
            prefer_failure: config.prefer_failure,
        })
    }
}

/// A serialized MAP request and the nonce it carries
#[derive(Debug, Clone)]
pub struct MapRequest {
    pub nonce: Nonce,
    pub bytes: Bytes,
}

/// Builds requests with nonces drawn from an injected entropy source
#[derive(Debug)]
pub struct Exchange<E> {
    entropy: E,
}

impl<E: EntropySource> Exchange<E> {
    pub fn new(entropy: E) -> Self {
        Self { entropy }
    }

    /// Generate a fresh nonce and serialize a MAP request around it
    pub fn build_map_request(&mut self, params: &MapParams) -> Result<MapRequest> {
        let nonce = self.entropy.nonce()?;
        let bytes = encode_map_request(params, nonce)?;
        info!(%nonce, size = bytes.len(), "Built MAP request");
        Ok(MapRequest { nonce, bytes })
    }
}

/// Serialize a MAP request with a caller-chosen nonce
pub fn encode_map_request(params: &MapParams, nonce: Nonce) -> Result<Bytes> {
    let header = RequestHeader {
        version: PCP_VERSION,
        opcode: OpCode::Map,
        requested_lifetime: params.requested_lifetime,
        client_addr: fixed_size_addr(params.client_addr),
    };
    let body = MapInfo {
        nonce,
        protocol: params.protocol,
        internal_port: params.port,
        external_port: params.port,
        external_addr: suggested_external_addr(params.client_addr),
    };

    let mut buf = [0u8; MAX_PAYLOAD_SIZE];
    let mut w = ByteWriter::new(&mut buf);
    header.encode(&mut w)?;
    body.encode(&mut w)?;
    if params.prefer_failure {
        PcpOption::PreferFailure.encode(&mut w)?;
    }
    Ok(Bytes::copy_from_slice(w.written()))
}

/// An accepted MAP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingResult {
    pub nonce: Nonce,
    /// Seconds the mapping is valid for
    pub lifetime: u32,
    /// Gateway epoch counter
    pub epoch_time: u32,
    pub protocol: u8,
    pub internal_port: u16,
    pub external_port: u16,
    /// IPv4 when the gateway assigned an IPv4-mapped address
    pub external_address: IpAddr,
    /// Options that followed the MAP body
    pub options: Vec<DecodedOption>,
}

/// Run the response gate over a received datagram.
///
/// `buf` must be exactly the received bytes.
pub fn validate_map_response(buf: &[u8], expected: &Nonce) -> Result<MappingResult> {
    let len = buf.len();
    if !(ResponseHeader::SIZE..=MAX_PAYLOAD_SIZE).contains(&len) || len % 4 != 0 {
        return Err(ProtocolError::InvalidLength(len));
    }

    let mut r = ByteReader::new(buf);
    let header = ResponseHeader::decode(&mut r)?;

    if header.version != PCP_VERSION {
        return Err(ProtocolError::UnsupportedVersion(header.version));
    }
    if !header.is_response() {
        return Err(ProtocolError::NotAResponse);
    }
    if header.result() == ResultCode::UnsupportedVersion {
        return Err(ProtocolError::ServerUnsupportedVersion);
    }
    if header.opcode() != OpCode::Map {
        return Err(ProtocolError::OpcodeMismatch {
            expected: OpCode::Map.code(),
            actual: header.opcode().code(),
        });
    }
    if header.result() != ResultCode::Success {
        return Err(ProtocolError::ServerResult(header.result()));
    }

    let body = MapInfo::decode(&mut r).map_err(|e| match e {
        ProtocolError::Truncated { needed, remaining } => {
            ProtocolError::MalformedBody { needed, remaining }
        }
        other => other,
    })?;

    if body.nonce != *expected {
        return Err(ProtocolError::NonceMismatch);
    }

    Ok(MappingResult {
        nonce: body.nonce,
        lifetime: header.lifetime,
        epoch_time: header.epoch_time,
        protocol: body.protocol,
        internal_port: body.internal_port,
        external_port: body.external_port,
        external_address: to_ip_addr(body.external_addr),
        options: trailing_options(r),
    })
}

/// Collect the options after the body; a malformed one ends the list
fn trailing_options(r: ByteReader<'_>) -> Vec<DecodedOption> {
    let mut options = Vec::new();
    for item in OptionIter::new(r) {
        match item {
            Ok(option) => options.push(option),
            Err(e) => {
                warn!(error = %e, parsed = options.len(), "Ignoring malformed response option");
                break;
            }
        }
    }
    options
}
