//! `tez account`: restore a faucet identity

use std::path::Path;
use tez_e2e::Faucet;

use crate::{output::Output, CliError};

/// Derive and print the key hash and public key of a faucet file
pub fn execute(faucet_file: &Path, json: bool) -> Result<(), CliError> {
    let faucet = Faucet::load(faucet_file)?;
    let wallet = faucet.wallet()?;
    let address = wallet.address().to_b58();
    let public_key = wallet.public_key().to_b58();

    Output::new(json)
        .field("pkh", &address)
        .field("public_key", &public_key)
        .field("email", &faucet.email)
        .message(&format!("Address: {}\nPublic key: {}", address, public_key))
        .print();
    Ok(())
}
