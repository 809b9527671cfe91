//! # tez-sdk
//!
//! Rust SDK for Tezos nodes and Michelson contracts.
//!
//! ## Features
//!
//! - **TezosClient**: RPC client for communicating with Tezos nodes
//! - **Wallet**: Ed25519 accounts, including fundraiser (faucet) restoration
//! - **OperationBuilder**: Manager operations with simulated limits and fees
//! - **Contract**: Entrypoint calls, storage decoding and big map lookups
//! - **Micheline**: Michelson values, typed decoding and PACK
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tez_sdk::{Contract, TezosClient, Wallet, ConfirmationPolicy, micheline::Token};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TezosClient::connect("https://api.tez.ie/rpc/babylonnet").await?;
//!     let wallet = Wallet::from_b58("edsk3QoqBuvdamxouPhin7swCvkQNgq4jP5KZPbwWNnwdZpSpJiEbq")?;
//!
//!     let token = Contract::at(&client, "KT18anmnvhqTsgqTwasxpLKYWcLJnGRX3m2D".parse()?).await?;
//!     println!("Methods: {:?}", token.methods());
//!
//!     let call = token.call("mint", &[Token::from(1_000u64)])?;
//!     let pending = client.submit(&wallet, call).await?;
//!     let confirmation = pending.confirmation(&client, &ConfirmationPolicy::default()).await?;
//!     println!("Included at level {}", confirmation.level);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
pub mod contract;
mod error;
pub mod micheline;
pub mod operation;
mod transport;
pub mod types;
pub mod units;
mod wallet;

// Re-export main types
pub use client::{Script, TezosClient};
pub use contract::{Contract, ContractCall};
pub use error::SdkError;
pub use operation::OperationBuilder;
pub use transport::{HttpMethod, MockTransport};
pub use types::{BlockHeader, Confirmation, ConfirmationPolicy, PendingOperation};
pub use units::{format_units, parse_units};

/// Re-export Transport trait for custom implementations
pub use transport::Transport;
pub use wallet::Wallet;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Re-export primitives for convenience
pub use tez_primitives::{Address, BlockHash, ChainId, Level, Mutez, OperationHash, ScriptExprHash};
