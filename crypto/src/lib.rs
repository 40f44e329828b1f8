#![deny(missing_docs)]
//! Cryptographic primitives used across the ink-miner network

mod hash;
mod keys;
mod signature;

pub use digest::Digest;

pub use hash::{Hash128, Hash128Data};
pub use keys::{KeyPair, PublicKey, SecretKey};
pub use signature::Signature;

/// Error type for key and signature decoding
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a hex string does not decode to valid bytes
    #[error("{0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Returned when decoded bytes do not form a valid P-256 scalar or point
    #[error("Bytes do not form a valid P-256 key")]
    InvalidKey,
}
