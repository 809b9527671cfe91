//! Test harness for E2E testing
//!
//! Wraps a node client and the token contract so scenarios only deal with
//! entrypoint names, arguments and storage snapshots.

use num_bigint::BigUint;
use tez_primitives::Address;
use tez_sdk::micheline::Token;
use tez_sdk::{Confirmation, ConfirmationPolicy, Contract, TezosClient, Wallet};
use tracing::info;

use crate::scenarios::TEST_AMOUNT;
use crate::storage::{read_storage, TokenStorage};
use crate::E2EResult;

/// Client, token contract and confirmation policy
pub struct TestHarness {
    client: TezosClient,
    contract: Contract,
    policy: ConfirmationPolicy,
}

impl TestHarness {
    /// Load the contract at `address` and build a harness around it
    pub async fn new(
        client: TezosClient,
        address: Address,
        policy: ConfirmationPolicy,
    ) -> E2EResult<Self> {
        let contract = Contract::at(&client, address).await?;
        info!(%address, methods = contract.methods().len(), "token contract loaded");
        Ok(Self {
            client,
            contract,
            policy,
        })
    }

    /// Node client
    pub fn client(&self) -> &TezosClient {
        &self.client
    }

    /// Token contract
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Confirmation policy used by [`send`](Self::send)
    pub fn policy(&self) -> &ConfirmationPolicy {
        &self.policy
    }

    /// Call `entrypoint` as `signer` and block until confirmed
    ///
    /// Errors from encoding, simulation, injection or confirmation are
    /// returned unchanged. Nothing is retried.
    pub async fn send(
        &self,
        signer: &Wallet,
        entrypoint: &str,
        args: &[Token],
    ) -> E2EResult<Confirmation> {
        let call = self.contract.call(entrypoint, args)?;
        let pending = self.client.submit(signer, call).await?;
        let confirmation = pending.confirmation(&self.client, &self.policy).await?;
        Ok(confirmation)
    }

    /// Snapshot of the token storage for `accounts`
    pub async fn storage(&self, accounts: &[Address]) -> E2EResult<TokenStorage> {
        read_storage(&self.client, &self.contract, accounts).await
    }
}

/// Everything the scenarios share: the harness and both faucet identities
pub struct SuiteContext {
    /// Harness around the token contract
    pub harness: TestHarness,
    /// Default identity; mints and sends the direct transfer
    pub faucet_a: Wallet,
    /// Second identity; approves and sends the delegated transfer
    pub faucet_b: Wallet,
    /// Raw amount minted and transferred
    pub amount: BigUint,
}

impl SuiteContext {
    /// Create a context moving [`TEST_AMOUNT`] per scenario
    pub fn new(harness: TestHarness, faucet_a: Wallet, faucet_b: Wallet) -> Self {
        Self {
            harness,
            faucet_a,
            faucet_b,
            amount: BigUint::from(TEST_AMOUNT),
        }
    }

    /// Override the amount moved per scenario
    pub fn with_amount(mut self, amount: BigUint) -> Self {
        self.amount = amount;
        self
    }

    /// Addresses of faucet A and faucet B, in that order
    pub fn accounts(&self) -> [Address; 2] {
        [*self.faucet_a.address(), *self.faucet_b.address()]
    }
}
