//! # tez-primitives
//!
//! Primitive types for talking to Tezos nodes.
//!
//! This crate provides Base58Check encoding with the protocol's prefix
//! table, account addresses and the Base58-encoded hash types returned by
//! the RPC.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
pub mod base58;
mod error;
mod hash;

pub use address::{Address, Curve};
pub use base58::Prefix;
pub use error::PrimitiveError;
pub use hash::{BlockHash, ChainId, OperationHash, ScriptExprHash};

/// Block level
pub type Level = i64;

/// Amount in mutez (10^-6 tez)
pub type Mutez = u64;
