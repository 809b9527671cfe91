//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// Transport/network error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status from the node
    #[error("RPC error: {status} - {message}")]
    Rpc {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the node
        message: String,
    },

    /// The node has no such resource (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Michelson value or type could not be handled
    #[error("Micheline error: {0}")]
    Micheline(String),

    /// Key or signature error
    #[error("Crypto error: {0}")]
    Crypto(#[from] tez_crypto::CryptoError),

    /// Malformed address, hash or Base58 string
    #[error("Invalid primitive: {0}")]
    Primitive(#[from] tez_primitives::PrimitiveError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Entrypoint not exposed by the contract
    #[error("Unknown entrypoint: {0}")]
    UnknownEntrypoint(String),

    /// Invalid human-readable token amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Operation failed in simulation or in the block that included it
    #[error("Operation rejected{}: {}", .hash.map(|h| format!(" ({})", h)).unwrap_or_default(), .errors.join(", "))]
    Rejected {
        /// Operation hash, if it was already injected
        hash: Option<tez_primitives::OperationHash>,
        /// Error identifiers reported by the node
        errors: Vec<String>,
    },

    /// Confirmation did not arrive in time
    #[error("Timed out after {seconds}s waiting for {hash}")]
    Timeout {
        /// Operation being waited on
        hash: tez_primitives::OperationHash,
        /// Configured timeout
        seconds: u64,
    },
}

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::Serialization(format!("invalid hex: {}", e))
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl SdkError {
    /// Whether the node reported the resource as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::NotFound(_))
    }
}
