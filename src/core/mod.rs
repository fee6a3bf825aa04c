//! # Core Protocol Components
//!
//! Wire-format codec for PCP messages.
//!
//! A message is a fixed 24-byte header, a fixed-size opcode body and zero
//! or more self-delimited options. Everything is big-endian and every
//! address is 128 bits wide.
//!
//! ## Components
//! - **Cursor**: bounds-checked reader/writer over caller-owned buffers
//! - **Address**: IPv4-mapped address helpers
//! - **Header**: request/response headers, opcodes, result codes
//! - **Body**: MAP and PEER opcode bodies, mapping nonce
//! - **Option**: THIRD_PARTY, PREFER_FAILURE, FILTER and unknown options
//!
//! ## Wire Format
//! ```text
//! [Header(24)] [Opcode Body(36 | 56)] [Option]*
//! ```
//!
//! ## Safety
//! - Encoders check the full structure size before writing a byte
//! - Decoders check the full structure size before reading a field
//! - Option bodies are length-checked before interpretation

pub mod address;
pub mod body;
pub mod cursor;
pub mod header;
pub mod option;

use cursor::{ByteReader, ByteWriter};

use crate::error::Result;

/// A fixed-size structure with an exact wire layout
pub trait WireFormat: Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Write the structure, or fail without writing anything
    fn encode(&self, w: &mut ByteWriter<'_>) -> Result<()>;

    /// Read the structure, or fail without consuming anything
    fn decode(r: &mut ByteReader<'_>) -> Result<Self>;

    /// Encode into a freshly allocated buffer of exactly `SIZE` bytes
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; Self::SIZE];
        self.encode(&mut ByteWriter::new(&mut buf))?;
        Ok(buf)
    }

    /// Decode from the start of `bytes`, ignoring anything after the structure
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(&mut ByteReader::new(bytes))
    }
}
