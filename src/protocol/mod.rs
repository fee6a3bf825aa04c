//! # Exchange Protocol
//!
//! One MAP request/response cycle: nonce generation, request
//! serialization and the ordered response gate.

pub mod entropy;
pub mod exchange;
