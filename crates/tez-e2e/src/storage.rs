//! Token storage reader
//!
//! The ledger lives in a big map, so the node never returns it with the
//! storage. Each requested account is looked up separately.

use num_bigint::BigUint;
use std::collections::BTreeMap;
use tez_primitives::Address;
use tez_sdk::micheline::Token;
use tez_sdk::{Contract, SdkError, TezosClient};
use tracing::{debug, warn};

use crate::{E2EError, E2EResult};

/// Per-account ledger entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Token balance in raw units
    pub balance: BigUint,
    /// Approved amounts by spender
    pub allowances: BTreeMap<Address, BigUint>,
}

impl LedgerEntry {
    fn from_token(token: &Token) -> Option<Self> {
        let balance = token.field("balance")?.as_nat()?;
        let allowances = match token.field("allowances") {
            Some(map) => map
                .as_map()?
                .iter()
                .map(|(spender, amount)| Some((*spender.as_address()?, amount.as_nat()?)))
                .collect::<Option<BTreeMap<_, _>>>()?,
            None => BTreeMap::new(),
        };
        Some(Self {
            balance,
            allowances,
        })
    }
}

/// Decoded token storage with the requested ledger entries
#[derive(Debug, Clone)]
pub struct TokenStorage {
    /// Ledger entries for exactly the requested accounts
    pub accounts: BTreeMap<Address, LedgerEntry>,
    /// Decimal precision
    pub decimals: u32,
    /// Display name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Total supply in raw units
    pub total_supply: BigUint,
    /// Full decoded storage
    pub raw: Token,
}

impl TokenStorage {
    /// Balance of `account`, zero when it was not requested
    pub fn balance(&self, account: &Address) -> BigUint {
        self.accounts
            .get(account)
            .map(|entry| entry.balance.clone())
            .unwrap_or_default()
    }
}

/// Read the token storage and the ledger entries of `accounts`
///
/// A failed lookup never fails the read: the account gets
/// [`LedgerEntry::default`]. Errors fetching the storage itself propagate.
pub async fn read_storage(
    client: &TezosClient,
    contract: &Contract,
    accounts: &[Address],
) -> E2EResult<TokenStorage> {
    let raw = contract.storage(client).await?;

    let decimals = nat_field(&raw, "decimals")?;
    let decimals = u32::try_from(decimals)
        .map_err(|_| E2EError::Assertion("decimals does not fit in u32".to_string()))?;
    let total_supply = nat_field(&raw, "totalSupply")?;
    let name = string_field(&raw, "name")?;
    let symbol = string_field(&raw, "symbol")?;

    let mut entries = BTreeMap::new();
    for account in accounts {
        let entry = match lookup_entry(client, contract, &raw, account).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(%account, "no ledger entry, using default");
                LedgerEntry::default()
            }
            Err(e) => {
                warn!(%account, error = %e, "ledger lookup failed, using default");
                LedgerEntry::default()
            }
        };
        entries.insert(*account, entry);
    }

    Ok(TokenStorage {
        accounts: entries,
        decimals,
        name,
        symbol,
        total_supply,
        raw,
    })
}

async fn lookup_entry(
    client: &TezosClient,
    contract: &Contract,
    storage: &Token,
    account: &Address,
) -> Result<Option<LedgerEntry>, SdkError> {
    let id = storage
        .field("accounts")
        .and_then(Token::as_big_map)
        .ok_or_else(|| SdkError::MissingField("accounts".to_string()))?;
    let ty = contract
        .storage_field_type("accounts")
        .ok_or_else(|| SdkError::MissingField("accounts".to_string()))?;
    let [key_ty, value_ty] = ty.args() else {
        return Err(SdkError::Micheline("accounts is not a big_map type".to_string()));
    };

    let value = contract
        .big_map_get(client, id, &Token::Address(*account), key_ty, value_ty)
        .await?;
    match value {
        Some(token) => LedgerEntry::from_token(&token)
            .map(Some)
            .ok_or_else(|| SdkError::Micheline(format!("unexpected ledger entry for {}", account))),
        None => Ok(None),
    }
}

fn nat_field(storage: &Token, name: &str) -> E2EResult<BigUint> {
    storage
        .field(name)
        .and_then(Token::as_nat)
        .ok_or_else(|| E2EError::Sdk(SdkError::MissingField(name.to_string())))
}

fn string_field(storage: &Token, name: &str) -> E2EResult<String> {
    storage
        .field(name)
        .and_then(Token::as_str)
        .map(str::to_string)
        .ok_or_else(|| E2EError::Sdk(SdkError::MissingField(name.to_string())))
}
