//! Wallet and account management

use tez_crypto::{fundraiser_seed, sign_operation, PublicKey, SecretKey, Signature};
use tez_primitives::Address;
use zeroize::Zeroize;

use crate::SdkError;

/// Wallet for managing an Ed25519 key and signing operations
///
/// Note: Clone is intentionally not implemented to prevent accidental key duplication.
pub struct Wallet {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl Wallet {
    /// Create a new random wallet
    pub fn new_random() -> Self {
        let mut seed: [u8; 32] = rand::random();
        let wallet = Self::from_secret_key(SecretKey::from_seed(&seed));
        seed.zeroize();
        wallet
    }

    /// Create a wallet from a secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key();
        let address = public_key.hash();
        Self {
            secret_key,
            public_key,
            address,
        }
    }

    /// Create a wallet from an `edsk` string
    pub fn from_b58(edsk: &str) -> Result<Self, SdkError> {
        Ok(Self::from_secret_key(SecretKey::from_b58(edsk)?))
    }

    /// Restore a fundraiser (faucet) account from its mnemonic, email and password
    pub fn from_fundraiser<S: AsRef<str>>(mnemonic: &[S], email: &str, password: &str) -> Self {
        let mut seed = fundraiser_seed(mnemonic, email, password);
        let wallet = Self::from_secret_key(SecretKey::from_seed(&seed));
        seed.zeroize();
        wallet
    }

    /// Get the wallet's address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the wallet's public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Sign forged operation bytes with the generic operation watermark
    pub fn sign_operation(&self, forged: &[u8]) -> Signature {
        sign_operation(&self.secret_key, forged)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_random() {
        let a = Wallet::new_random();
        let b = Wallet::new_random();
        assert!(a.address().is_implicit());
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_wallet_from_b58() {
        let wallet = Wallet::from_b58("edsk3QoqBuvdamxouPhin7swCvkQNgq4jP5KZPbwWNnwdZpSpJiEbq").unwrap();
        assert_eq!(wallet.address().to_b58(), "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb");
        assert_eq!(
            wallet.public_key().to_b58(),
            "edpkvGfYw3LyB1UcCahKQk4rF2tvbMUk8GFiTuMjL75uGXrpvKXhjn"
        );
    }

    #[test]
    fn test_wallet_from_fundraiser() {
        let words = "shrug lecture spoil buzz lake solar jar grant patch cradle pepper shallow dish ribbon hungry";
        let mnemonic: Vec<&str> = words.split(' ').collect();
        let wallet = Wallet::from_fundraiser(&mnemonic, "xyzabcde.tezos@tezos.example.org", "Pw3xAmpl3");
        assert_eq!(wallet.address().to_b58(), "tz1eMbUHzad9RS1HiiJ7dwFivUyRMqtDbiLg");
    }

    #[test]
    fn test_wallet_invalid_key() {
        assert!(Wallet::from_b58("edsk1234").is_err());
    }

    #[test]
    fn test_wallet_sign_operation_verifies() {
        let wallet = Wallet::new_random();
        let signature = wallet.sign_operation(&[0xaa; 40]);
        assert_ne!(signature, Signature::ZERO);
    }

    #[test]
    fn test_wallet_debug_hides_key() {
        let wallet = Wallet::new_random();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("Wallet"));
        assert!(debug.contains("address"));
        assert!(!debug.contains("secret_key"));
    }
}
