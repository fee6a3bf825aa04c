//! # Message Headers
//!
//! Fixed 24-byte request and response headers, plus the opcode and
//! result-code enumerations they carry.
//!
//! ## Wire Format
//! ```text
//! Request:  [Version(1)] [R=0|Opcode(1)] [Reserved(2)] [Lifetime(4)] [Client Address(16)]
//! Response: [Version(1)] [R=1|Opcode(1)] [Reserved(1)] [Result(1)] [Lifetime(4)] [Epoch(4)] [Reserved(12)]
//! ```

use std::fmt;
use std::net::Ipv6Addr;

use super::cursor::{ByteReader, ByteWriter};
use super::WireFormat;
use crate::error::Result;

/// High bit of the opcode byte; set on responses
pub const RESPONSE_BIT: u8 = 0x80;

/// Low seven bits of the opcode byte
pub const OPCODE_MASK: u8 = 0x7f;

/// Operation requested from the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Announce,
    Map,
    Peer,
    /// Any other 7-bit opcode
    Other(u8),
}

impl OpCode {
    /// The 7-bit wire value
    pub fn code(self) -> u8 {
        match self {
            OpCode::Announce => 0,
            OpCode::Map => 1,
            OpCode::Peer => 2,
            OpCode::Other(code) => code & OPCODE_MASK,
        }
    }
}

impl From<u8> for OpCode {
    /// Interprets the low seven bits; the direction bit is ignored
    fn from(byte: u8) -> Self {
        match byte & OPCODE_MASK {
            0 => OpCode::Announce,
            1 => OpCode::Map,
            2 => OpCode::Peer,
            other => OpCode::Other(other),
        }
    }
}

/// Outcome reported by the gateway in a response header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Success,
    UnsupportedVersion,
    NotAuthorized,
    MalformedRequest,
    UnsupportedOpcode,
    UnsupportedOption,
    MalformedOption,
    NetworkFailure,
    NoResources,
    UnsupportedProtocol,
    UserExceededQuota,
    CannotProvideExternal,
    AddressMismatch,
    ExcessiveRemotePeers,
    /// A code this client has no name for, kept verbatim
    Other(u8),
}

impl ResultCode {
    pub fn code(self) -> u8 {
        match self {
            ResultCode::Success => 0,
            ResultCode::UnsupportedVersion => 1,
            ResultCode::NotAuthorized => 2,
            ResultCode::MalformedRequest => 3,
            ResultCode::UnsupportedOpcode => 4,
            ResultCode::UnsupportedOption => 5,
            ResultCode::MalformedOption => 6,
            ResultCode::NetworkFailure => 7,
            ResultCode::NoResources => 8,
            ResultCode::UnsupportedProtocol => 9,
            ResultCode::UserExceededQuota => 10,
            ResultCode::CannotProvideExternal => 11,
            ResultCode::AddressMismatch => 12,
            ResultCode::ExcessiveRemotePeers => 13,
            ResultCode::Other(code) => code,
        }
    }

    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ResultCode::Success => "SUCCESS",
            ResultCode::UnsupportedVersion => "UNSUPP_VERSION",
            ResultCode::NotAuthorized => "NOT_AUTHORIZED",
            ResultCode::MalformedRequest => "MALFORMED_REQUEST",
            ResultCode::UnsupportedOpcode => "UNSUPP_OPCODE",
            ResultCode::UnsupportedOption => "UNSUPP_OPTION",
            ResultCode::MalformedOption => "MALFORMED_OPTION",
            ResultCode::NetworkFailure => "NETWORK_FAILURE",
            ResultCode::NoResources => "NO_RESOURCES",
            ResultCode::UnsupportedProtocol => "UNSUPP_PROTOCOL",
            ResultCode::UserExceededQuota => "USER_EX_QUOTA",
            ResultCode::CannotProvideExternal => "CANNOT_PROVIDE_EXTERNAL",
            ResultCode::AddressMismatch => "ADDRESS_MISMATCH",
            ResultCode::ExcessiveRemotePeers => "EXCESSIVE_REMOTE_PEERS",
            ResultCode::Other(_) => "UNKNOWN",
        }
    }
}

impl From<u8> for ResultCode {
    fn from(code: u8) -> Self {
        match code {
            0 => ResultCode::Success,
            1 => ResultCode::UnsupportedVersion,
            2 => ResultCode::NotAuthorized,
            3 => ResultCode::MalformedRequest,
            4 => ResultCode::UnsupportedOpcode,
            5 => ResultCode::UnsupportedOption,
            6 => ResultCode::MalformedOption,
            7 => ResultCode::NetworkFailure,
            8 => ResultCode::NoResources,
            9 => ResultCode::UnsupportedProtocol,
            10 => ResultCode::UserExceededQuota,
            11 => ResultCode::CannotProvideExternal,
            12 => ResultCode::AddressMismatch,
            13 => ResultCode::ExcessiveRemotePeers,
            other => ResultCode::Other(other),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Common header of every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub version: u8,
    pub opcode: OpCode,
    /// Seconds the mapping should remain valid
    pub requested_lifetime: u32,
    /// The client's own address, in 128-bit form
    pub client_addr: Ipv6Addr,
}

impl WireFormat for RequestHeader {
    const SIZE: usize = 24;

    fn encode(&self, w: &mut ByteWriter<'_>) -> Result<()> {
        w.reserve(Self::SIZE)?;
        w.write_u8(self.version)?;
        w.write_u8(self.opcode.code() & OPCODE_MASK)?;
        w.write_zeros(2)?;
        w.write_u32(self.requested_lifetime)?;
        w.write_bytes(&self.client_addr.octets())?;
        Ok(())
    }

    fn decode(r: &mut ByteReader<'_>) -> Result<Self> {
        r.require(Self::SIZE)?;
        let version = r.read_u8()?;
        let opcode = OpCode::from(r.read_u8()?);
        r.skip(2)?;
        let requested_lifetime = r.read_u32()?;
        let client_addr = Ipv6Addr::from(r.read_array::<16>()?);
        Ok(Self {
            version,
            opcode,
            requested_lifetime,
            client_addr,
        })
    }
}

/// Common header of every response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub version: u8,
    /// Raw opcode byte: direction bit plus the echoed opcode
    pub r_opcode: u8,
    /// Raw result code byte
    pub result_code: u8,
    /// Seconds granted by the gateway
    pub lifetime: u32,
    /// Gateway epoch counter
    pub epoch_time: u32,
}

impl ResponseHeader {
    /// Build a response header echoing `opcode`, with the response bit set
    pub fn new(
        version: u8,
        opcode: OpCode,
        result: ResultCode,
        lifetime: u32,
        epoch_time: u32,
    ) -> Self {
        Self {
            version,
            r_opcode: RESPONSE_BIT | opcode.code(),
            result_code: result.code(),
            lifetime,
            epoch_time,
        }
    }

    pub fn is_response(&self) -> bool {
        self.r_opcode & RESPONSE_BIT != 0
    }

    /// The echoed opcode, direction bit masked off
    pub fn opcode(&self) -> OpCode {
        OpCode::from(self.r_opcode)
    }

    pub fn result(&self) -> ResultCode {
        ResultCode::from(self.result_code)
    }
}

impl WireFormat for ResponseHeader {
    const SIZE: usize = 24;

    fn encode(&self, w: &mut ByteWriter<'_>) -> Result<()> {
        w.reserve(Self::SIZE)?;
        w.write_u8(self.version)?;
        w.write_u8(self.r_opcode)?;
        w.write_zeros(1)?;
        w.write_u8(self.result_code)?;
        w.write_u32(self.lifetime)?;
        w.write_u32(self.epoch_time)?;
        w.write_zeros(12)?;
        Ok(())
    }

    fn decode(r: &mut ByteReader<'_>) -> Result<Self> {
        r.require(Self::SIZE)?;
        let version = r.read_u8()?;
        let r_opcode = r.read_u8()?;
        r.skip(1)?;
        let result_code = r.read_u8()?;
        let lifetime = r.read_u32()?;
        let epoch_time = r.read_u32()?;
        r.skip(12)?;
        Ok(Self {
            version,
            r_opcode,
            result_code,
            lifetime,
            epoch_time,
        })
    }
}
