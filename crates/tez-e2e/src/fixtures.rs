//! Faucet identities and deployment records
//!
//! Both are JSON files produced outside this crate: faucet files come from
//! the test network faucet, the deployment record from the origination step.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use tez_primitives::Address;
use tez_sdk::Wallet;

use crate::{E2EError, E2EResult};

/// Faucet account file
#[derive(Debug, Clone, Deserialize)]
pub struct Faucet {
    /// Fundraiser mnemonic words
    pub mnemonic: Vec<String>,
    /// Fundraiser email
    pub email: String,
    /// Fundraiser password
    pub password: String,
    /// Expected public key hash
    #[serde(default)]
    pub pkh: Option<Address>,
    /// Activation secret
    #[serde(default)]
    pub secret: Option<String>,
    /// Activation amount in mutez
    #[serde(default)]
    pub amount: Option<String>,
}

impl Faucet {
    /// Load a faucet file
    pub fn load(path: impl AsRef<Path>) -> E2EResult<Self> {
        load_json(path.as_ref())
    }

    /// Restore the signing identity
    ///
    /// Fails when the file records a `pkh` that the credentials do not derive.
    pub fn wallet(&self) -> E2EResult<Wallet> {
        let wallet = Wallet::from_fundraiser(&self.mnemonic, &self.email, &self.password);
        match self.pkh {
            Some(pkh) if pkh != *wallet.address() => Err(E2EError::Setup(format!(
                "faucet credentials derive {} but the file records {}",
                wallet.address(),
                pkh
            ))),
            _ => Ok(wallet),
        }
    }
}

/// Deployed contract record
#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    /// Originated contract address
    pub address: Address,
}

impl Deployment {
    /// Load a deployment record; unknown fields are ignored
    pub fn load(path: impl AsRef<Path>) -> E2EResult<Self> {
        load_json(path.as_ref())
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> E2EResult<T> {
    let fixture_error = |reason: String| E2EError::Fixture {
        path: path.to_path_buf(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| fixture_error(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| fixture_error(e.to_string()))
}
