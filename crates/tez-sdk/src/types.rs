//! SDK types

use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tez_primitives::{BlockHash, ChainId, Level, OperationHash};

use crate::{SdkError, TezosClient};

/// Block header fields the SDK relies on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockHeader {
    /// Block hash
    pub hash: BlockHash,
    /// Block level (height)
    pub level: Level,
    /// Protocol hash
    #[serde(default)]
    pub protocol: String,
    /// Chain the block belongs to
    #[serde(default)]
    pub chain_id: Option<ChainId>,
    /// Block timestamp (RFC 3339)
    #[serde(default)]
    pub timestamp: String,
}

/// Protocol constants used for operation limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProtocolConstants {
    /// Maximum gas a single operation may consume
    #[serde(deserialize_with = "string_or_number")]
    pub hard_gas_limit_per_operation: u64,
    /// Maximum storage a single operation may burn
    #[serde(deserialize_with = "string_or_number")]
    pub hard_storage_limit_per_operation: u64,
}

impl Default for ProtocolConstants {
    fn default() -> Self {
        Self {
            hard_gas_limit_per_operation: 1_040_000,
            hard_storage_limit_per_operation: 60_000,
        }
    }
}

/// Accept both `"123"` and `123`, the node encodes big numbers as strings
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        Raw::Num(n) => Ok(n),
    }
}

/// How long and how deep to wait for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Required number of blocks, counting the including block
    pub confirmations: u32,
    /// Delay between head polls
    pub poll_interval: Duration,
    /// Give up after this long
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirmations: 1,
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(180),
        }
    }
}

/// An operation that reached the requested depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Operation hash
    pub hash: OperationHash,
    /// Level of the block that included it
    pub level: Level,
    /// Blocks on top of and including the inclusion block when observed
    pub confirmations: u32,
}

/// Injected operation handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    /// Operation hash
    pub hash: OperationHash,
    /// Head level at injection time; the operation lands strictly above it
    pub injected_at: Level,
}

impl PendingOperation {
    /// Create a new pending operation
    pub fn new(hash: OperationHash, injected_at: Level) -> Self {
        Self { hash, injected_at }
    }

    /// Get the operation hash
    pub fn hash(&self) -> &OperationHash {
        &self.hash
    }

    /// Block until the operation is included and confirmed
    pub async fn confirmation(
        &self,
        client: &TezosClient,
        policy: &ConfirmationPolicy,
    ) -> Result<Confirmation, SdkError> {
        client.wait_for_confirmation(self, policy).await
    }
}
