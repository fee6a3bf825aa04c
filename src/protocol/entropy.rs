//! Entropy sources for mapping nonces
//!
//! The exchange never calls a global generator; it is handed an
//! [`EntropySource`]. Production code uses [`OsEntropy`]; tests can plug in
//! a seeded [`RngEntropy`] for reproducible nonces.

use crate::core::body::{Nonce, NONCE_SIZE};
use crate::error::{ProtocolError, Result};
use rand::RngCore;

/// Producer of uniformly random bytes
pub trait EntropySource {
    /// Fill `dest` with random bytes
    fn fill(&mut self, dest: &mut [u8]) -> Result<()>;

    /// Generate a fresh mapping nonce
    fn nonce(&mut self) -> Result<Nonce> {
        let mut bytes = [0u8; NONCE_SIZE];
        self.fill(&mut bytes)?;
        Ok(Nonce::from_bytes(bytes))
    }
}

/// Operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        getrandom::fill(dest).map_err(|e| ProtocolError::Entropy(e.to_string()))
    }
}

/// Adapter over any `rand` generator
#[derive(Debug, Clone)]
pub struct RngEntropy<R>(pub R);

impl<R: RngCore> EntropySource for RngEntropy<R> {
    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        self.0.fill_bytes(dest);
        Ok(())
    }
}

impl<E: EntropySource + ?Sized> EntropySource for &mut E {
    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        (**self).fill(dest)
    }
}
