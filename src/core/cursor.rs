//! # Byte Cursor
//!
//! Bounds-checked big-endian reader and writer over caller-owned buffers.
//!
//! Every structure in the wire format is encoded and decoded through these
//! two types; no codec routine indexes a buffer directly. Structure-level
//! routines call [`ByteWriter::reserve`] / [`ByteReader::require`] for their
//! full fixed size before touching any field, so a failed encode leaves the
//! destination untouched and a failed decode produces no output. The
//! primitives still check their own bounds and never panic.

use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut};

/// Write cursor over a fixed-capacity byte buffer
#[derive(Debug)]
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    /// Wrap a destination buffer; capacity is the buffer length
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current write offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total capacity of the underlying buffer
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes still available for writing
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fail with `BufferOverflow` unless `len` more bytes fit
    pub fn reserve(&self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(ProtocolError::BufferOverflow {
                needed: len,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?;
        self.tail().put_u8(value);
        self.pos += 1;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.reserve(2)?;
        self.tail().put_u16(value);
        self.pos += 2;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.reserve(4)?;
        self.tail().put_u32(value);
        self.pos += 4;
        Ok(())
    }

    pub fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.reserve(src.len())?;
        self.tail().put_slice(src);
        self.pos += src.len();
        Ok(())
    }

    /// Fill a reserved region; reserved bytes are always written as zero
    pub fn write_zeros(&mut self, len: usize) -> Result<()> {
        self.reserve(len)?;
        self.tail().put_bytes(0, len);
        self.pos += len;
        Ok(())
    }

    /// The bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    fn tail(&mut self) -> &mut [u8] {
        &mut self.buf[self.pos..]
    }
}

/// Read cursor over a received byte buffer
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current read offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail with `Truncated` unless `len` more bytes are available
    pub fn require(&self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(ProtocolError::Truncated {
                needed: len,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.require(1)?;
        let value = self.tail().get_u8();
        self.pos += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.require(2)?;
        let value = self.tail().get_u16();
        self.pos += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.require(4)?;
        let value = self.tail().get_u32();
        self.pos += 4;
        Ok(value)
    }

    /// Read exactly `N` raw bytes
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.require(N)?;
        let mut out = [0u8; N];
        self.tail().copy_to_slice(&mut out);
        self.pos += N;
        Ok(out)
    }

    /// Skip a region without interpreting it
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.require(len)?;
        self.pos += len;
        Ok(())
    }

    /// The unconsumed tail of the buffer
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn tail(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}
