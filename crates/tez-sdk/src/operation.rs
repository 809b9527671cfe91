//! Manager operation builder and fee estimation

use serde::{Serialize, Serializer};
use serde_json::Value;
use tez_crypto::PublicKey;
use tez_primitives::{Address, BlockHash, Mutez};

use crate::contract::ContractCall;
use crate::micheline::Micheline;
use crate::types::ProtocolConstants;
use crate::SdkError;

/// Base fee every manager operation pays, in mutez
pub const MINIMAL_FEE_MUTEZ: u64 = 100;
/// Fee per unit of gas, in nanotez
pub const MINIMAL_NANOTEZ_PER_GAS: u64 = 100;
/// Fee per byte of the signed operation, in mutez
pub const MINIMAL_MUTEZ_PER_BYTE: u64 = 1;
/// Extra gas on top of the simulated consumption
pub const GAS_MARGIN: u64 = 100;
/// Extra storage on top of the simulated size diff
pub const STORAGE_MARGIN: u64 = 20;
/// Extra fee on top of the minimal fee
pub const FEE_MARGIN: u64 = 100;
/// Signature bytes appended to the forged operation
pub const SIGNATURE_SIZE: usize = 64;

fn as_string<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

/// Contract call parameters of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameters {
    /// Entrypoint name
    pub entrypoint: String,
    /// Argument value
    pub value: Micheline,
}

/// Kind-specific part of a manager operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
    /// Publish the source's public key
    Reveal {
        /// `edpk...`
        public_key: String,
    },
    /// Transfer tez, optionally calling a contract
    Transaction {
        /// Amount in mutez
        #[serde(serialize_with = "as_string")]
        amount: Mutez,
        /// Receiving account
        destination: Address,
        /// Entrypoint call
        #[serde(skip_serializing_if = "Option::is_none")]
        parameters: Option<Parameters>,
    },
}

/// Fee and resource limits of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limits {
    /// Fee in mutez
    pub fee: Mutez,
    /// Gas limit
    pub gas_limit: u64,
    /// Storage limit in bytes
    pub storage_limit: u64,
}

impl Limits {
    /// Zero fee and protocol maximums, for simulation
    pub fn simulation(constants: &ProtocolConstants) -> Self {
        Self {
            fee: 0,
            gas_limit: constants.hard_gas_limit_per_operation,
            storage_limit: constants.hard_storage_limit_per_operation,
        }
    }
}

/// One manager operation in RPC form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerOperation {
    /// What the operation does
    #[serde(flatten)]
    pub kind: OperationKind,
    /// Paying account
    pub source: Address,
    /// Fee in mutez
    #[serde(serialize_with = "as_string")]
    pub fee: Mutez,
    /// Source counter
    #[serde(serialize_with = "as_string")]
    pub counter: u64,
    /// Gas limit
    #[serde(serialize_with = "as_string")]
    pub gas_limit: u64,
    /// Storage limit
    #[serde(serialize_with = "as_string")]
    pub storage_limit: u64,
}

/// A batch of manager operations anchored on a block, ready to forge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsignedOperation {
    /// Block the operation is anchored on
    pub branch: BlockHash,
    /// Operations in the batch
    pub contents: Vec<ManagerOperation>,
}

/// Operation builder with fluent API
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    source: Address,
    branch: Option<BlockHash>,
    counter: Option<u64>,
    kinds: Vec<OperationKind>,
}

impl OperationBuilder {
    /// Create a new builder for operations paid by `source`
    pub fn new(source: Address) -> Self {
        Self {
            source,
            branch: None,
            counter: None,
            kinds: Vec::new(),
        }
    }

    /// Set the branch
    pub fn branch(mut self, branch: BlockHash) -> Self {
        self.branch = Some(branch);
        self
    }

    /// Set the counter of the first operation
    pub fn counter(mut self, counter: u64) -> Self {
        self.counter = Some(counter);
        self
    }

    /// Reveal `public_key`; reveals always go first in the batch
    pub fn reveal(mut self, public_key: &PublicKey) -> Self {
        self.kinds.insert(
            0,
            OperationKind::Reveal {
                public_key: public_key.to_b58(),
            },
        );
        self
    }

    /// Add a contract call
    pub fn call(mut self, call: ContractCall) -> Self {
        self.kinds.push(OperationKind::Transaction {
            amount: call.amount,
            destination: call.destination,
            parameters: Some(Parameters {
                entrypoint: call.entrypoint,
                value: call.value,
            }),
        });
        self
    }

    /// Number of operations in the batch
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Build with one set of limits per operation
    pub fn build(&self, limits: &[Limits]) -> Result<UnsignedOperation, SdkError> {
        let branch = self.branch.ok_or(SdkError::MissingField("branch".to_string()))?;
        let counter = self.counter.ok_or(SdkError::MissingField("counter".to_string()))?;
        if self.kinds.is_empty() {
            return Err(SdkError::MissingField("contents".to_string()));
        }
        if limits.len() != self.kinds.len() {
            return Err(SdkError::MissingField(format!(
                "limits for {} operations, got {}",
                self.kinds.len(),
                limits.len()
            )));
        }

        let contents = self
            .kinds
            .iter()
            .zip(limits)
            .enumerate()
            .map(|(i, (kind, limits))| ManagerOperation {
                kind: kind.clone(),
                source: self.source,
                fee: limits.fee,
                counter: counter + i as u64,
                gas_limit: limits.gas_limit,
                storage_limit: limits.storage_limit,
            })
            .collect();

        Ok(UnsignedOperation { branch, contents })
    }

    /// Build with zero fees and protocol maximums, for `run_operation`
    pub fn build_for_simulation(
        &self,
        constants: &ProtocolConstants,
    ) -> Result<UnsignedOperation, SdkError> {
        self.build(&vec![Limits::simulation(constants); self.kinds.len()])
    }
}

// ==================== Estimation ====================

/// Resources one operation consumed in simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Estimate {
    /// Gas consumed, rounded up to whole units
    pub gas: u64,
    /// Storage paid, in bytes
    pub storage: u64,
}

/// Read per-operation resource usage from a `run_operation` result
///
/// Any result other than `applied` fails the whole batch with the error ids
/// the node reported.
pub fn parse_simulation(result: &Value) -> Result<Vec<Estimate>, SdkError> {
    let contents = result
        .get("contents")
        .and_then(Value::as_array)
        .ok_or_else(|| SdkError::MissingField("contents".to_string()))?;

    let mut errors = Vec::new();
    let mut estimates = Vec::with_capacity(contents.len());

    for content in contents {
        let metadata = content
            .get("metadata")
            .ok_or_else(|| SdkError::MissingField("metadata".to_string()))?;
        let outcome = metadata
            .get("operation_result")
            .ok_or_else(|| SdkError::MissingField("operation_result".to_string()))?;

        collect_errors(outcome, &mut errors);
        let mut estimate = usage(outcome);

        if let Some(internals) = metadata.get("internal_operation_results").and_then(Value::as_array) {
            for internal in internals {
                if let Some(outcome) = internal.get("result") {
                    collect_errors(outcome, &mut errors);
                    let extra = usage(outcome);
                    estimate.gas += extra.gas;
                    estimate.storage += extra.storage;
                }
            }
        }
        estimates.push(estimate);
    }

    if !errors.is_empty() {
        return Err(SdkError::Rejected { hash: None, errors });
    }
    Ok(estimates)
}

/// Collect error ids from an operation result that was not applied
pub(crate) fn collect_errors(outcome: &Value, errors: &mut Vec<String>) {
    let status = outcome.get("status").and_then(Value::as_str).unwrap_or("unknown");
    if status == "applied" {
        return;
    }

    let ids: Vec<String> = outcome
        .get("errors")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|e| e.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if ids.is_empty() {
        errors.push(status.to_string());
    } else {
        errors.extend(ids);
    }
}

fn usage(outcome: &Value) -> Estimate {
    let number = |key: &str| -> Option<u64> {
        match outcome.get(key)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    };

    let gas = match number("consumed_milligas") {
        Some(milligas) => milligas.div_ceil(1000),
        None => number("consumed_gas").unwrap_or(0),
    };
    Estimate {
        gas,
        storage: number("paid_storage_size_diff").unwrap_or(0),
    }
}

/// Fee for an operation using `gas_limit` gas and `size` bytes
pub fn compute_fee(gas_limit: u64, size: usize) -> Mutez {
    MINIMAL_FEE_MUTEZ
        + (gas_limit * MINIMAL_NANOTEZ_PER_GAS).div_ceil(1000)
        + size as u64 * MINIMAL_MUTEZ_PER_BYTE
        + FEE_MARGIN
}

/// Turn simulation results into limits, splitting the signed size evenly
pub fn limits_from_estimates(estimates: &[Estimate], forged_size: usize) -> Vec<Limits> {
    let count = estimates.len().max(1);
    let share = (forged_size + SIGNATURE_SIZE).div_ceil(count);

    estimates
        .iter()
        .map(|estimate| {
            let gas_limit = estimate.gas + GAS_MARGIN;
            Limits {
                fee: compute_fee(gas_limit, share),
                gas_limit,
                storage_limit: estimate.storage + STORAGE_MARGIN,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SOURCE: &str = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb";
    const KT1: &str = "KT18anmnvhqTsgqTwasxpLKYWcLJnGRX3m2D";

    fn call() -> ContractCall {
        ContractCall {
            destination: KT1.parse().unwrap(),
            entrypoint: "mint".to_string(),
            value: Micheline::int(5),
            amount: 0,
        }
    }

    fn branch() -> BlockHash {
        BlockHash::from_bytes([0xab; 32])
    }

    #[test]
    fn test_build_serializes_rpc_form() {
        let op = OperationBuilder::new(SOURCE.parse().unwrap())
            .branch(branch())
            .counter(7)
            .call(call())
            .build(&[Limits { fee: 1420, gas_limit: 10_600, storage_limit: 300 }])
            .unwrap();

        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "branch": branch().to_b58(),
                "contents": [{
                    "kind": "transaction",
                    "source": SOURCE,
                    "fee": "1420",
                    "counter": "7",
                    "gas_limit": "10600",
                    "storage_limit": "300",
                    "amount": "0",
                    "destination": KT1,
                    "parameters": {"entrypoint": "mint", "value": {"int": "5"}}
                }]
            })
        );
    }

    #[test]
    fn test_reveal_goes_first_with_consecutive_counters() {
        let key = tez_crypto::PublicKey::from_b58("edpkvGfYw3LyB1UcCahKQk4rF2tvbMUk8GFiTuMjL75uGXrpvKXhjn").unwrap();
        let builder = OperationBuilder::new(SOURCE.parse().unwrap())
            .branch(branch())
            .counter(11)
            .call(call())
            .reveal(&key);
        assert_eq!(builder.len(), 2);

        let op = builder.build_for_simulation(&ProtocolConstants::default()).unwrap();
        assert!(matches!(op.contents[0].kind, OperationKind::Reveal { .. }));
        assert_eq!(op.contents[0].counter, 11);
        assert_eq!(op.contents[1].counter, 12);
        assert_eq!(op.contents[1].gas_limit, 1_040_000);
        assert_eq!(op.contents[1].fee, 0);

        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["contents"][0]["kind"], "reveal");
        assert_eq!(json["contents"][0]["public_key"], key.to_b58());
    }

    #[test]
    fn test_build_missing_fields() {
        let builder = OperationBuilder::new(SOURCE.parse().unwrap()).call(call());
        assert!(matches!(builder.build(&[Limits::default()]), Err(SdkError::MissingField(f)) if f == "branch"));

        let builder = builder.branch(branch());
        assert!(matches!(builder.build(&[Limits::default()]), Err(SdkError::MissingField(f)) if f == "counter"));

        let builder = builder.counter(1);
        assert!(builder.build(&[]).is_err());
        assert!(OperationBuilder::new(SOURCE.parse().unwrap()).branch(branch()).counter(1).build(&[]).is_err());
    }

    #[test]
    fn test_parse_simulation_applied() {
        let result = json!({"contents": [
            {"kind": "reveal", "metadata": {"operation_result": {"status": "applied", "consumed_gas": "10000"}}},
            {"kind": "transaction", "metadata": {
                "operation_result": {"status": "applied", "consumed_milligas": "25350500", "paid_storage_size_diff": "67"},
                "internal_operation_results": [
                    {"result": {"status": "applied", "consumed_gas": "100", "paid_storage_size_diff": "3"}}
                ]
            }}
        ]});

        let estimates = parse_simulation(&result).unwrap();
        assert_eq!(estimates, vec![
            Estimate { gas: 10_000, storage: 0 },
            Estimate { gas: 25_351 + 100, storage: 70 },
        ]);
    }

    #[test]
    fn test_parse_simulation_failed() {
        let result = json!({"contents": [
            {"kind": "transaction", "metadata": {"operation_result": {
                "status": "failed",
                "errors": [
                    {"kind": "temporary", "id": "proto.005-PsBabyM1.michelson_v1.runtime_error"},
                    {"kind": "temporary", "id": "proto.005-PsBabyM1.michelson_v1.script_rejected"}
                ]
            }}}
        ]});

        match parse_simulation(&result) {
            Err(SdkError::Rejected { hash: None, errors }) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[1].ends_with("script_rejected"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simulation_backtracked_without_errors() {
        let result = json!({"contents": [
            {"metadata": {"operation_result": {"status": "backtracked"}}}
        ]});
        assert!(matches!(
            parse_simulation(&result),
            Err(SdkError::Rejected { errors, .. }) if errors == vec!["backtracked".to_string()]
        ));
    }

    #[test]
    fn test_fee_formula() {
        // 100 + ceil(10_100 / 10) + 150 + 100
        assert_eq!(compute_fee(10_100, 150), 1_360);
        assert_eq!(compute_fee(1, 0), 201);
    }

    #[test]
    fn test_limits_from_estimates() {
        let limits = limits_from_estimates(
            &[Estimate { gas: 10_000, storage: 0 }, Estimate { gas: 20_000, storage: 67 }],
            136,
        );
        // (136 + 64) / 2 = 100 bytes each
        assert_eq!(limits[0], Limits { fee: 100 + 1_010 + 100 + 100, gas_limit: 10_100, storage_limit: 20 });
        assert_eq!(limits[1], Limits { fee: 100 + 2_010 + 100 + 100, gas_limit: 20_100, storage_limit: 87 });
    }
}
