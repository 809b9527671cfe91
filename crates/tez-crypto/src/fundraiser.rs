//! Fundraiser key derivation
//!
//! Faucet and fundraiser accounts are described by a 15-word mnemonic, an
//! email and a password. The Ed25519 seed is the first half of the BIP-39
//! seed computed with `email || password` as passphrase.

use sha2::Sha512;
use zeroize::Zeroize;

/// PBKDF2 rounds fixed by BIP-39
const PBKDF2_ROUNDS: u32 = 2048;

/// Derive the 32-byte Ed25519 seed of a fundraiser account
///
/// Words are joined with single spaces. Inputs are used as given; no
/// Unicode normalization is applied.
pub fn fundraiser_seed<S: AsRef<str>>(mnemonic: &[S], email: &str, password: &str) -> [u8; 32] {
    let mut phrase = mnemonic
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    let mut salt = format!("mnemonic{}{}", email, password);

    let mut full = [0u8; 64];
    pbkdf2::pbkdf2_hmac::<Sha512>(phrase.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut full);

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&full[..32]);

    full.zeroize();
    phrase.zeroize();
    salt.zeroize();
    seed
}
