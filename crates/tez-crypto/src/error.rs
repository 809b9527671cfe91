//! Cryptographic errors

use thiserror::Error;

/// Cryptographic operation error
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material could not be parsed
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Signature could not be parsed
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Signature does not verify against the message
    #[error("signature verification failed")]
    Verification,

    /// Base58 / primitive decoding error
    #[error(transparent)]
    Primitive(#[from] tez_primitives::PrimitiveError),
}
