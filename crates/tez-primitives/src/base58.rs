//! Base58Check encoding with Tezos prefixes
//!
//! Every Base58 string the protocol emits is `base58check(prefix || payload)`
//! where the prefix bytes are chosen so the encoded string starts with a
//! fixed human-readable tag (`tz1`, `KT1`, `edpk`, ...).

use crate::PrimitiveError;

/// A Base58Check prefix and the payload length it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix {
    /// Human-readable tag the encoded string starts with
    pub name: &'static str,
    /// Raw prefix bytes prepended before encoding
    pub bytes: &'static [u8],
    /// Expected payload length in bytes
    pub payload_len: usize,
}

impl Prefix {
    /// Ed25519 public key hash
    pub const TZ1: Prefix = Prefix { name: "tz1", bytes: &[6, 161, 159], payload_len: 20 };
    /// Secp256k1 public key hash
    pub const TZ2: Prefix = Prefix { name: "tz2", bytes: &[6, 161, 161], payload_len: 20 };
    /// P-256 public key hash
    pub const TZ3: Prefix = Prefix { name: "tz3", bytes: &[6, 161, 164], payload_len: 20 };
    /// Originated contract hash
    pub const KT1: Prefix = Prefix { name: "KT1", bytes: &[2, 90, 121], payload_len: 20 };
    /// Ed25519 public key
    pub const EDPK: Prefix = Prefix { name: "edpk", bytes: &[13, 15, 37, 217], payload_len: 32 };
    /// Ed25519 seed (32-byte secret key form)
    pub const EDSK_SEED: Prefix = Prefix { name: "edsk", bytes: &[13, 15, 58, 7], payload_len: 32 };
    /// Ed25519 expanded secret key (seed || public key)
    pub const EDSK: Prefix = Prefix { name: "edsk", bytes: &[43, 246, 78, 7], payload_len: 64 };
    /// Ed25519 signature
    pub const EDSIG: Prefix = Prefix { name: "edsig", bytes: &[9, 245, 205, 134, 18], payload_len: 64 };
    /// Block hash
    pub const BLOCK: Prefix = Prefix { name: "B", bytes: &[1, 52], payload_len: 32 };
    /// Operation hash
    pub const OPERATION: Prefix = Prefix { name: "o", bytes: &[5, 116], payload_len: 32 };
    /// Chain identifier
    pub const CHAIN_ID: Prefix = Prefix { name: "Net", bytes: &[87, 82, 0], payload_len: 4 };
    /// Script expression hash (big_map keys)
    pub const SCRIPT_EXPR: Prefix = Prefix { name: "expr", bytes: &[13, 44, 64, 27], payload_len: 32 };
}

/// Encode `payload` with `prefix` as Base58Check
pub fn encode_check(prefix: Prefix, payload: &[u8]) -> Result<String, PrimitiveError> {
    if payload.len() != prefix.payload_len {
        return Err(PrimitiveError::InvalidLength {
            expected: prefix.payload_len,
            got: payload.len(),
        });
    }
    let mut data = Vec::with_capacity(prefix.bytes.len() + payload.len());
    data.extend_from_slice(prefix.bytes);
    data.extend_from_slice(payload);
    Ok(bs58::encode(data).with_check().into_string())
}

/// Decode a Base58Check string, verify its prefix and return the payload
pub fn decode_check(prefix: Prefix, s: &str) -> Result<Vec<u8>, PrimitiveError> {
    let data = bs58::decode(s)
        .with_check(None)
        .into_vec()
        .map_err(|e| PrimitiveError::Base58(e.to_string()))?;

    let payload = data
        .strip_prefix(prefix.bytes)
        .ok_or(PrimitiveError::InvalidPrefix { expected: prefix.name })?;

    if payload.len() != prefix.payload_len {
        return Err(PrimitiveError::InvalidLength {
            expected: prefix.payload_len,
            got: payload.len(),
        });
    }
    Ok(payload.to_vec())
}
