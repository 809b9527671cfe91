//! FA1.2 scenarios
//!
//! Each scenario reads the storage before and after its operations and
//! asserts only deltas. Later scenarios rely on the balances earlier ones
//! leave behind: the transfers spend what the mint credited.

use num_bigint::BigUint;
use std::fmt;
use tez_primitives::Address;
use tez_sdk::format_units;
use tez_sdk::micheline::Token;
use tracing::info;

use crate::harness::SuiteContext;
use crate::storage::TokenStorage;
use crate::{E2EError, E2EResult};

/// Entrypoints the token must expose
pub const EXPECTED_METHODS: [&str; 7] = [
    "transfer",
    "mint",
    "getTotalSupply",
    "getBalance",
    "getAllowance",
    "burn",
    "approve",
];

/// Expected decimal precision
pub const EXPECTED_DECIMALS: u32 = 18;

/// Expected ticker symbol
pub const EXPECTED_SYMBOL: &str = "pTez";

/// Expected display name
pub const EXPECTED_NAME: &str = "Pool Tezos coin";

/// Raw amount minted and transferred (2 tokens at 18 decimals)
pub const TEST_AMOUNT: u128 = 2_000_000_000_000_000_000;

/// The scenarios, in the order they must run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Entrypoint surface
    Methods,
    /// Token metadata
    Properties,
    /// Mint to faucet A
    Mint,
    /// Transfer from faucet A to faucet B
    TransferDirect,
    /// Approval then transfer from faucet B to faucet A
    TransferDelegated,
}

impl Scenario {
    /// Full suite order
    pub const ALL: [Scenario; 5] = [
        Scenario::Methods,
        Scenario::Properties,
        Scenario::Mint,
        Scenario::TransferDirect,
        Scenario::TransferDelegated,
    ];

    /// Short name
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Methods => "methods",
            Scenario::Properties => "properties",
            Scenario::Mint => "mint",
            Scenario::TransferDirect => "transfer-a-to-b",
            Scenario::TransferDelegated => "transfer-b-to-a",
        }
    }

    /// Run the scenario
    pub async fn run(&self, ctx: &SuiteContext) -> E2EResult<ScenarioReport> {
        let message = match self {
            Scenario::Methods => methods(ctx)?,
            Scenario::Properties => properties(ctx).await?,
            Scenario::Mint => mint(ctx).await?,
            Scenario::TransferDirect => transfer_direct(ctx).await?,
            Scenario::TransferDelegated => transfer_delegated(ctx).await?,
        };
        Ok(ScenarioReport {
            scenario: *self,
            message,
        })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a passed scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    /// Which scenario passed
    pub scenario: Scenario,
    /// `[OK] ...` summary, possibly spanning several lines
    pub message: String,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn ensure(condition: bool, message: &str) -> E2EResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2EError::Assertion(message.to_string()))
    }
}

fn units(storage: &TokenStorage, raw: &BigUint) -> String {
    format!("{} {}", format_units(raw, storage.decimals), storage.symbol)
}

// ==================== Scenarios ====================

fn methods(ctx: &SuiteContext) -> E2EResult<String> {
    // Only the count is compared; a different set of seven names passes too.
    let count = ctx.harness.contract().methods().len();
    ensure(count == EXPECTED_METHODS.len(), "Some methods doesn't exist")?;
    Ok(format!("[OK] Methods: {}.", EXPECTED_METHODS.join(", ")))
}

async fn properties(ctx: &SuiteContext) -> E2EResult<String> {
    let storage = ctx.harness.storage(&[]).await?;

    ensure(storage.decimals == EXPECTED_DECIMALS, "Decimals should be 18")?;
    ensure(storage.symbol == EXPECTED_SYMBOL, "Symbol must be pTez")?;
    ensure(storage.name == EXPECTED_NAME, "Name should be Pool Tezos coin")?;

    Ok(format!(
        "[OK] Token properties. Symbol: {}, Name: {}, Decimals: {}.",
        storage.symbol, storage.name, storage.decimals
    ))
}

async fn mint(ctx: &SuiteContext) -> E2EResult<String> {
    let [a, b] = ctx.accounts();
    let value = &ctx.amount;

    let before = ctx.harness.storage(&[a, b]).await?;
    info!(amount = %value, to = %a, "minting");
    ctx.harness
        .send(&ctx.faucet_a, "mint", &[Token::Nat(value.clone())])
        .await?;
    let after = ctx.harness.storage(&[a, b]).await?;

    ensure(
        before.balance(&a) + value == after.balance(&a),
        "Balance plus value should be equal to balance after mint.",
    )?;
    ensure(
        &before.total_supply + value == after.total_supply,
        "TotalSupply should be the same.",
    )?;

    Ok(format!(
        "[OK] Mint amount {}, check supply and account balance.\n    \
         Total supply: {}.\n    \
         Balance {}: {}.\n    \
         Balance {}: {}.",
        units(&before, value),
        units(&after, &after.total_supply),
        a,
        units(&after, &after.balance(&a)),
        b,
        units(&after, &after.balance(&b)),
    ))
}

async fn transfer_direct(ctx: &SuiteContext) -> E2EResult<String> {
    let [a, b] = ctx.accounts();
    let value = &ctx.amount;

    let before = ctx.harness.storage(&[a, b]).await?;
    ctx.harness
        .send(&ctx.faucet_a, "transfer", &transfer_args(a, b, value))
        .await?;
    let after = ctx.harness.storage(&[a, b]).await?;

    assert_moved(&before, &after, a, b, value, ("A", "B"))?;
    Ok(transfer_message(&before, &after, a, b, value))
}

async fn transfer_delegated(ctx: &SuiteContext) -> E2EResult<String> {
    let [a, b] = ctx.accounts();
    let value = &ctx.amount;

    let before = ctx.harness.storage(&[a, b]).await?;
    ctx.harness
        .send(
            &ctx.faucet_b,
            "approve",
            &[Token::Address(a), Token::Nat(value.clone())],
        )
        .await?;
    ctx.harness
        .send(&ctx.faucet_b, "transfer", &transfer_args(b, a, value))
        .await?;
    let after = ctx.harness.storage(&[a, b]).await?;

    assert_moved(&before, &after, b, a, value, ("B", "A"))?;
    Ok(transfer_message(&before, &after, b, a, value))
}

fn transfer_args(from: Address, to: Address, value: &BigUint) -> [Token; 3] {
    [
        Token::Address(from),
        Token::Address(to),
        Token::Nat(value.clone()),
    ]
}

fn assert_moved(
    before: &TokenStorage,
    after: &TokenStorage,
    from: Address,
    to: Address,
    value: &BigUint,
    labels: (&str, &str),
) -> E2EResult<()> {
    // Compared as after + value == before so an underflow cannot panic.
    ensure(
        after.balance(&from) + value == before.balance(&from),
        &format!(
            "Balance minus value should be equal to balance after transfer for account {}.",
            labels.0
        ),
    )?;
    ensure(
        before.balance(&to) + value == after.balance(&to),
        &format!(
            "Balance plus value should be equal to balance after transfer for account {}.",
            labels.1
        ),
    )
}

fn transfer_message(
    before: &TokenStorage,
    after: &TokenStorage,
    from: Address,
    to: Address,
    value: &BigUint,
) -> String {
    let line = |account: Address| {
        format!(
            "Account: {} - Initial balance: {} - Balance after: {}.",
            account,
            units(before, &before.balance(&account)),
            units(after, &after.balance(&account)),
        )
    };
    format!(
        "[OK] Transfer amount of {} from {} to {}.\n  {}\n  {}",
        units(before, value),
        from,
        to,
        line(from),
        line(to),
    )
}
