//! Common error types for primitives

use thiserror::Error;

/// Primitive operation error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Base58Check decoding failed (bad alphabet or checksum)
    #[error("base58 error: {0}")]
    Base58(String),

    /// Decoded payload does not start with the expected prefix
    #[error("invalid prefix: expected {expected}")]
    InvalidPrefix {
        /// Human-readable prefix that was expected (e.g. "tz1")
        expected: &'static str,
    },

    /// Payload has the wrong length
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Expected payload length
        expected: usize,
        /// Actual payload length
        got: usize,
    },

    /// Binary address starts with an unknown tag
    #[error("unknown address tag: {0:#04x}")]
    UnknownAddressTag(u8),

    /// String is not a recognised address
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}
