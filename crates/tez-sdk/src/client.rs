//! TezosClient - main RPC client

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tez_crypto::{operation_hash, Signature};
use tez_primitives::{Address, BlockHash, ChainId, Level, Mutez, OperationHash, ScriptExprHash};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::contract::ContractCall;
use crate::micheline::{BigMapId, Micheline};
use crate::operation::{collect_errors, limits_from_estimates, parse_simulation, OperationBuilder, UnsignedOperation};
use crate::transport::{deserialize_response, HttpMethod, MockTransport, Transport};
use crate::types::{BlockHeader, Confirmation, ConfirmationPolicy, PendingOperation, ProtocolConstants};
use crate::{SdkError, Wallet};

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

const HEAD: &str = "/chains/main/blocks/head";

/// Validation pass holding manager operations
const MANAGER_PASS: usize = 3;

/// Script of an originated contract
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// `parameter`, `storage` and `code` sections
    pub code: Micheline,
    /// Current storage value
    pub storage: Micheline,
}

/// Tezos client for RPC communication
pub struct TezosClient {
    transport: Box<dyn Transport>,
    chain_id: Option<ChainId>,
}

impl TezosClient {
    /// Create a new client with HTTP transport
    #[cfg(feature = "http")]
    pub async fn connect(url: &str) -> Result<Self, SdkError> {
        let transport = HttpTransport::new(url);
        let mut client = Self {
            transport: Box::new(transport),
            chain_id: None,
        };

        // Fetch and cache chain ID
        let chain_id = client.fetch_chain_id().await?;
        debug!(%url, %chain_id, "connected");
        client.chain_id = Some(chain_id);

        Ok(client)
    }

    /// Create a new client with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self::with_transport(MockTransport::new())
    }

    /// Create a client with a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            chain_id: None,
        }
    }

    /// Helper method to make RPC request and deserialize
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, SdkError> {
        let value = self.transport.request_json(method, path, body).await?;
        deserialize_response(value)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, SdkError> {
        self.request(HttpMethod::Get, path, None).await
    }

    async fn post<T: serde::de::DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, SdkError> {
        self.request(HttpMethod::Post, path, Some(body)).await
    }

    // ==================== Chain Info ====================

    /// Get the chain ID
    pub async fn chain_id(&self) -> Result<ChainId, SdkError> {
        if let Some(id) = self.chain_id {
            return Ok(id);
        }
        self.fetch_chain_id().await
    }

    async fn fetch_chain_id(&self) -> Result<ChainId, SdkError> {
        self.get("/chains/main/chain_id").await
    }

    /// Hash of the current head
    pub async fn head_hash(&self) -> Result<BlockHash, SdkError> {
        self.get(&format!("{}/hash", HEAD)).await
    }

    /// Header of the current head
    pub async fn head_header(&self) -> Result<BlockHeader, SdkError> {
        self.get(&format!("{}/header", HEAD)).await
    }

    /// Protocol constants at the head
    pub async fn constants(&self) -> Result<ProtocolConstants, SdkError> {
        self.get(&format!("{}/context/constants", HEAD)).await
    }

    // ==================== Account Queries ====================

    /// Tez balance in mutez
    pub async fn balance(&self, address: &Address) -> Result<Mutez, SdkError> {
        let raw: String = self.get(&contract_path(address, "balance")).await?;
        parse_u64(&raw)
    }

    /// Current counter of an implicit account
    pub async fn counter(&self, address: &Address) -> Result<u64, SdkError> {
        let raw: String = self.get(&contract_path(address, "counter")).await?;
        parse_u64(&raw)
    }

    /// Revealed public key, `None` while unrevealed
    pub async fn manager_key(&self, address: &Address) -> Result<Option<String>, SdkError> {
        self.get(&contract_path(address, "manager_key")).await
    }

    // ==================== Contract Queries ====================

    /// Contract code and storage
    pub async fn script(&self, address: &Address) -> Result<Script, SdkError> {
        self.get(&contract_path(address, "script")).await
    }

    /// Raw contract storage
    pub async fn storage(&self, address: &Address) -> Result<Micheline, SdkError> {
        self.get(&contract_path(address, "storage")).await
    }

    /// Named entrypoints and their argument types
    pub async fn entrypoints(&self, address: &Address) -> Result<BTreeMap<String, Micheline>, SdkError> {
        #[derive(Deserialize)]
        struct Entrypoints {
            #[serde(default)]
            entrypoints: BTreeMap<String, Micheline>,
        }

        let response: Entrypoints = self.get(&contract_path(address, "entrypoints")).await?;
        Ok(response.entrypoints)
    }

    /// Value stored under `key` in a big map, `None` if absent
    pub async fn big_map_get(
        &self,
        id: BigMapId,
        key: &ScriptExprHash,
    ) -> Result<Option<Micheline>, SdkError> {
        let path = format!("{}/context/big_maps/{}/{}", HEAD, id, key);
        match self.get(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(SdkError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ==================== Operation Plumbing ====================

    /// Forge an operation into its binary form
    pub async fn forge_operations(&self, operation: &UnsignedOperation) -> Result<Vec<u8>, SdkError> {
        let body = serde_json::to_value(operation)?;
        let forged: String = self
            .post(&format!("{}/helpers/forge/operations", HEAD), body)
            .await?;
        Ok(hex::decode(forged)?)
    }

    /// Simulate an operation without checking its signature
    pub async fn run_operation(
        &self,
        operation: &UnsignedOperation,
        chain_id: &ChainId,
    ) -> Result<Value, SdkError> {
        let body = serde_json::json!({
            "operation": {
                "branch": operation.branch,
                "contents": operation.contents,
                "signature": Signature::ZERO.to_b58(),
            },
            "chain_id": chain_id,
        });
        self.post(&format!("{}/helpers/scripts/run_operation", HEAD), body)
            .await
    }

    /// Inject a signed operation (`forged || signature`)
    pub async fn inject_operation(&self, signed: &[u8]) -> Result<OperationHash, SdkError> {
        self.post("/injection/operation?chain=main", Value::String(hex::encode(signed)))
            .await
    }

    /// Manager operations included in the block at `level`
    pub async fn block_operations(&self, level: Level) -> Result<Vec<Value>, SdkError> {
        self.get(&format!("/chains/main/blocks/{}/operations/{}", level, MANAGER_PASS))
            .await
    }

    // ==================== Operation Submission ====================

    /// Sign and inject a contract call paid by `signer`
    ///
    /// Reveals the signer's key first when needed. Limits and fees come from
    /// a simulation; a simulation that is not applied is returned as
    /// [`SdkError::Rejected`] and nothing is injected.
    pub async fn submit(&self, signer: &Wallet, call: ContractCall) -> Result<PendingOperation, SdkError> {
        let source = *signer.address();
        let entrypoint = call.entrypoint.clone();

        let header = self.head_header().await?;
        let chain_id = self.chain_id().await?;
        let constants = self.constants().await?;
        let counter = self.counter(&source).await? + 1;

        let mut builder = OperationBuilder::new(source)
            .branch(header.hash)
            .counter(counter)
            .call(call);
        if self.manager_key(&source).await?.is_none() {
            debug!(%source, "key not revealed, adding reveal");
            builder = builder.reveal(signer.public_key());
        }

        let simulation = builder.build_for_simulation(&constants)?;
        let result = self.run_operation(&simulation, &chain_id).await?;
        let estimates = parse_simulation(&result)?;
        debug!(?estimates, "simulation applied");

        let draft = builder.build(&limits_from_estimates(&estimates, 0))?;
        let size = self.forge_operations(&draft).await?.len();
        let operation = builder.build(&limits_from_estimates(&estimates, size))?;
        let forged = self.forge_operations(&operation).await?;

        let signature = signer.sign_operation(&forged);
        let expected = operation_hash(&forged, &signature);
        let mut signed = forged;
        signed.extend_from_slice(&signature.to_bytes());

        let hash = self.inject_operation(&signed).await?;
        if hash != expected {
            warn!(%hash, %expected, "node returned an unexpected operation hash");
        }

        let fee: Mutez = operation.contents.iter().map(|c| c.fee).sum();
        info!(%hash, %source, %entrypoint, fee, "operation injected");
        Ok(PendingOperation::new(hash, header.level))
    }

    /// Poll until `pending` is included and has enough confirmations
    pub async fn wait_for_confirmation(
        &self,
        pending: &PendingOperation,
        policy: &ConfirmationPolicy,
    ) -> Result<Confirmation, SdkError> {
        let deadline = Instant::now() + policy.timeout;
        let hash_str = pending.hash.to_b58();
        let mut next_level = pending.injected_at + 1;
        let mut included: Option<Level> = None;

        loop {
            let head = self.head_header().await?;

            while included.is_none() && next_level <= head.level {
                let operations = self.block_operations(next_level).await?;
                if let Some(op) = operations
                    .iter()
                    .find(|op| op.get("hash").and_then(Value::as_str) == Some(hash_str.as_str()))
                {
                    check_applied(op, pending.hash)?;
                    debug!(hash = %pending.hash, level = next_level, "operation included");
                    included = Some(next_level);
                }
                next_level += 1;
            }

            if let Some(level) = included {
                let depth = u32::try_from(head.level - level + 1).unwrap_or(0);
                if depth >= policy.confirmations {
                    info!(hash = %pending.hash, level, confirmations = depth, "operation confirmed");
                    return Ok(Confirmation {
                        hash: pending.hash,
                        level,
                        confirmations: depth,
                    });
                }
            }

            if Instant::now() >= deadline {
                return Err(SdkError::Timeout {
                    hash: pending.hash,
                    seconds: policy.timeout.as_secs(),
                });
            }
            tokio::time::sleep(policy.poll_interval).await;
        }
    }
}

// ==================== Helper Functions ====================

fn contract_path(address: &Address, resource: &str) -> String {
    format!("{}/context/contracts/{}/{}", HEAD, address, resource)
}

fn parse_u64(s: &str) -> Result<u64, SdkError> {
    s.parse()
        .map_err(|_| SdkError::Serialization(format!("expected an unsigned integer, got '{}'", s)))
}

/// Fail with the node's errors if any content of an included operation failed
fn check_applied(operation: &Value, hash: OperationHash) -> Result<(), SdkError> {
    let mut errors = Vec::new();
    let contents = operation
        .get("contents")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for content in contents {
        let Some(metadata) = content.get("metadata") else {
            continue;
        };
        if let Some(outcome) = metadata.get("operation_result") {
            collect_errors(outcome, &mut errors);
        }
        if let Some(internals) = metadata.get("internal_operation_results").and_then(Value::as_array) {
            for outcome in internals.iter().filter_map(|i| i.get("result")) {
                collect_errors(outcome, &mut errors);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SdkError::Rejected {
            hash: Some(hash),
            errors,
        })
    }
}
