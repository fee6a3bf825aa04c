//! # Error Types
//!
//! Error handling for the PCP client.
//!
//! Every failure the crate can produce is a variant of [`ProtocolError`].
//! Codec and validation failures are ordinary values: a truncated or
//! malformed datagram from the network is an expected condition, so none
//! of these paths panic.
//!
//! ## Error Categories
//! - **Codec Errors**: encode overflow, truncated input, malformed options
//! - **Validation Errors**: the ordered response checks of a MAP exchange
//! - **Server Errors**: a non-success result code reported by the gateway
//! - **Ambient Errors**: I/O, entropy, configuration
//!
//! ## Example Usage
//! ```rust
//! use pcp_client::core::body::Nonce;
//! use pcp_client::error::ProtocolError;
//! use pcp_client::protocol::exchange::validate_map_response;
//!
//! let nonce = Nonce::from_bytes([0u8; 12]);
//! match validate_map_response(&[0u8; 23], &nonce) {
//!     Err(ProtocolError::InvalidLength(23)) => {}
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use crate::core::header::ResultCode;
use std::io;
use thiserror::Error;

// ProtocolError is the error type for all client operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Buffer overflow: need {needed} bytes, {remaining} available")]
    BufferOverflow { needed: usize, remaining: usize },

    #[error("Truncated input: need {needed} bytes, {remaining} available")]
    Truncated { needed: usize, remaining: usize },

    #[error("Malformed option: code {code} with length {length}")]
    MalformedOption { code: u8, length: u16 },

    #[error("Option length {declared} exceeds remaining {remaining} bytes")]
    OptionOverrun { declared: usize, remaining: usize },

    #[error("Invalid response size: {0}")]
    InvalidLength(usize),

    #[error("Received message with unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    #[error("Received message is not a response")]
    NotAResponse,

    #[error("Server response: unsupported protocol version")]
    ServerUnsupportedVersion,

    #[error("Received message is not a MAP response: opcode={actual} (expected {expected})")]
    OpcodeMismatch { expected: u8, actual: u8 },

    #[error("Server response: result_code={} ({})", .0.code(), .0)]
    ServerResult(ResultCode),

    #[error("Invalid map response specific data: need {needed} bytes, {remaining} available")]
    MalformedBody { needed: usize, remaining: usize },

    #[error("Mapping nonce mismatch")]
    NonceMismatch,

    #[error("Entropy source failure: {0}")]
    Entropy(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Address family mismatch")]
    AddressFamilyMismatch,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// True for failures produced while walking a byte buffer
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::BufferOverflow { .. }
                | ProtocolError::Truncated { .. }
                | ProtocolError::MalformedOption { .. }
                | ProtocolError::OptionOverrun { .. }
        )
    }

    /// The gateway's result code, when the gateway rejected the request
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            ProtocolError::ServerResult(code) => Some(*code),
            ProtocolError::ServerUnsupportedVersion => Some(ResultCode::UnsupportedVersion),
            _ => None,
        }
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
