//! Blake2b hashing

use blake2::digest::consts::{U20, U32};
use blake2::{Blake2b, Digest};

type Blake2b160 = Blake2b<U20>;
type Blake2b256 = Blake2b<U32>;

/// Blake2b with a 32-byte digest (operation hashes, script expression hashes, signing)
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    Blake2b256::digest(data).into()
}

/// Blake2b with a 20-byte digest (public key hashes)
pub fn blake2b_160(data: &[u8]) -> [u8; 20] {
    Blake2b160::digest(data).into()
}
