//! # tez-crypto
//!
//! Cryptographic primitives for Tezos.
//!
//! - Blake2b hashing (160 and 256 bit)
//! - Ed25519 signing/verification
//! - Fundraiser (mnemonic + email + password) key derivation
//! - Public key hash and operation hash derivation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod fundraiser;
mod hash;
mod signature;

pub use error::CryptoError;
pub use fundraiser::fundraiser_seed;
pub use hash::{blake2b_160, blake2b_256};
pub use signature::{
    operation_hash, sign_operation, PublicKey, SecretKey, Signature, GENERIC_OPERATION_WATERMARK,
};
