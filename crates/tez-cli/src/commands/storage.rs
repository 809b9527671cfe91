//! `tez storage`: token metadata and ledger entries

use num_bigint::BigUint;
use serde_json::{json, Value};
use tez_e2e::{Faucet, TokenStorage};
use tez_primitives::Address;
use tez_sdk::format_units;

use super::connect_harness;
use crate::{output::Output, CliError, Config};

/// Print the token storage for `addresses`, or for both faucets when empty
pub async fn execute(config: &Config, addresses: &[String], json: bool) -> Result<(), CliError> {
    let accounts = if addresses.is_empty() {
        vec![
            *Faucet::load(&config.faucet_a)?.wallet()?.address(),
            *Faucet::load(&config.faucet_b)?.wallet()?.address(),
        ]
    } else {
        addresses
            .iter()
            .map(|a| a.parse().map_err(|_| CliError::InvalidAddress(a.clone())))
            .collect::<Result<Vec<Address>, _>>()?
    };

    let harness = connect_harness(config).await?;
    let storage = harness.storage(&accounts).await?;

    Output::new(json)
        .field("contract", &harness.contract().address().to_b58())
        .field("name", &storage.name)
        .field("symbol", &storage.symbol)
        .field_u64("decimals", u64::from(storage.decimals))
        .field("total_supply", &storage.total_supply.to_string())
        .field_value("accounts", accounts_json(&storage))
        .message(&render(&storage))
        .print();
    Ok(())
}

fn accounts_json(storage: &TokenStorage) -> Value {
    let accounts: serde_json::Map<String, Value> = storage
        .accounts
        .iter()
        .map(|(address, entry)| {
            let allowances: serde_json::Map<String, Value> = entry
                .allowances
                .iter()
                .map(|(spender, amount)| (spender.to_b58(), json!(amount.to_string())))
                .collect();
            (
                address.to_b58(),
                json!({"balance": entry.balance.to_string(), "allowances": allowances}),
            )
        })
        .collect();
    Value::Object(accounts)
}

fn render(storage: &TokenStorage) -> String {
    let amount = |raw: &BigUint| format!("{} {}", format_units(raw, storage.decimals), storage.symbol);
    let mut lines = vec![
        format!("Name: {}", storage.name),
        format!("Symbol: {}", storage.symbol),
        format!("Decimals: {}", storage.decimals),
        format!("Total supply: {}", amount(&storage.total_supply)),
    ];
    for (address, entry) in &storage.accounts {
        lines.push(format!("Balance {}: {}", address, amount(&entry.balance)));
        for (spender, allowance) in &entry.allowances {
            lines.push(format!("  Allowance for {}: {}", spender, amount(allowance)));
        }
    }
    lines.join("\n")
}
