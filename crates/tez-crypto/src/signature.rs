//! Ed25519 keys and operation signatures

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use tez_primitives::base58::{decode_check, encode_check, Prefix};
use tez_primitives::{Address, OperationHash};
use zeroize::Zeroize;

use crate::{blake2b_160, blake2b_256, CryptoError};

/// Watermark prepended to forged manager operations before signing
pub const GENERIC_OPERATION_WATERMARK: u8 = 0x03;

/// Ed25519 secret key
///
/// Clone is intentionally not implemented; the key is zeroized on drop.
pub struct SecretKey(SigningKey);

impl SecretKey {
    /// Create from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        SecretKey(SigningKey::from_bytes(seed))
    }

    /// Parse an `edsk` string, either the 32-byte seed or the 64-byte expanded form
    pub fn from_b58(s: &str) -> Result<Self, CryptoError> {
        if let Ok(mut seed) = decode_check(Prefix::EDSK_SEED, s) {
            let key = Self::from_seed_slice(&seed);
            seed.zeroize();
            return key;
        }

        let mut expanded = decode_check(Prefix::EDSK, s)
            .map_err(|_| CryptoError::InvalidKey("expected an edsk secret key".to_string()))?;
        let key = Self::from_seed_slice(&expanded[..32]);
        let embedded_public = expanded[32..].to_vec();
        expanded.zeroize();

        let key = key?;
        if key.public_key().to_bytes()[..] != embedded_public[..] {
            return Err(CryptoError::InvalidKey(
                "embedded public key does not match seed".to_string(),
            ));
        }
        Ok(key)
    }

    fn from_seed_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        let mut seed: [u8; 32] = slice
            .try_into()
            .map_err(|_| CryptoError::InvalidKey(format!("expected 32 bytes, got {}", slice.len())))?;
        let key = Self::from_seed(&seed);
        seed.zeroize();
        Ok(key)
    }

    /// Encode the seed as an `edsk` string
    pub fn to_b58(&self) -> String {
        let mut seed = self.0.to_bytes();
        let encoded = encode_check(Prefix::EDSK_SEED, &seed).unwrap_or_default();
        seed.zeroize();
        encoded
    }

    /// Derive the public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Sign raw bytes
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("public_key", &self.public_key().to_b58())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Parse an `edpk` string
    pub fn from_b58(s: &str) -> Result<Self, CryptoError> {
        let bytes = decode_check(Prefix::EDPK, s)?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKey("expected 32 bytes".to_string()))?;
        VerifyingKey::from_bytes(&bytes)
            .map(PublicKey)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Encode as an `edpk` string
    pub fn to_b58(&self) -> String {
        encode_check(Prefix::EDPK, self.0.as_bytes()).unwrap_or_default()
    }

    /// Raw 32 bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Public key hash, i.e. the tz1 address controlled by this key
    pub fn hash(&self) -> Address {
        Address::ed25519(blake2b_160(self.0.as_bytes()))
    }

    /// Verify a signature over raw bytes
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.0
            .verify(message, &sig)
            .map_err(|_| CryptoError::Verification)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_b58())
    }
}

/// Ed25519 signature (64 bytes)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    /// All-zero signature, accepted by the node for simulation only
    pub const ZERO: Signature = Signature([0u8; 64]);

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Signature(bytes)
    }

    /// Parse an `edsig` string
    pub fn from_b58(s: &str) -> Result<Self, CryptoError> {
        let bytes = decode_check(Prefix::EDSIG, s)?;
        let bytes: [u8; 64] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidSignature("expected 64 bytes".to_string()))?;
        Ok(Signature(bytes))
    }

    /// Encode as an `edsig` string
    pub fn to_b58(&self) -> String {
        encode_check(Prefix::EDSIG, &self.0).unwrap_or_default()
    }

    /// Raw bytes
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", self.to_b58())
    }
}

/// Sign forged operation bytes
///
/// The signed message is `blake2b_256(0x03 || forged)`.
pub fn sign_operation(key: &SecretKey, forged: &[u8]) -> Signature {
    key.sign(&watermarked_digest(forged))
}

/// Digest a forged operation the way the node verifies it
pub(crate) fn watermarked_digest(forged: &[u8]) -> [u8; 32] {
    let mut data = Vec::with_capacity(forged.len() + 1);
    data.push(GENERIC_OPERATION_WATERMARK);
    data.extend_from_slice(forged);
    blake2b_256(&data)
}

/// Hash of a signed operation (`forged || signature`)
pub fn operation_hash(forged: &[u8], signature: &Signature) -> OperationHash {
    let mut data = Vec::with_capacity(forged.len() + 64);
    data.extend_from_slice(forged);
    data.extend_from_slice(&signature.0);
    OperationHash::from_bytes(blake2b_256(&data))
}
