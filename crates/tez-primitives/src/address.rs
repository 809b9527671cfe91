//! Tezos account addresses (tz1/tz2/tz3 implicit accounts, KT1 contracts)

use std::fmt;
use std::str::FromStr;

use crate::base58::{decode_check, encode_check, Prefix};
use crate::PrimitiveError;

/// Signature curve of an implicit account
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Curve {
    /// tz1
    Ed25519,
    /// tz2
    Secp256k1,
    /// tz3
    P256,
}

impl Curve {
    fn tag(self) -> u8 {
        match self {
            Curve::Ed25519 => 0,
            Curve::Secp256k1 => 1,
            Curve::P256 => 2,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, PrimitiveError> {
        match tag {
            0 => Ok(Curve::Ed25519),
            1 => Ok(Curve::Secp256k1),
            2 => Ok(Curve::P256),
            other => Err(PrimitiveError::UnknownAddressTag(other)),
        }
    }

    fn prefix(self) -> Prefix {
        match self {
            Curve::Ed25519 => Prefix::TZ1,
            Curve::Secp256k1 => Prefix::TZ2,
            Curve::P256 => Prefix::TZ3,
        }
    }
}

/// Account address
///
/// Implicit accounts are identified by the hash of their public key,
/// originated accounts (smart contracts) by a hash assigned at origination.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Address {
    /// Key-controlled account (tz1, tz2, tz3)
    Implicit {
        /// Curve of the controlling key
        curve: Curve,
        /// Blake2b-160 hash of the public key
        hash: [u8; 20],
    },
    /// Smart contract (KT1)
    Originated([u8; 20]),
}

impl Address {
    /// Size of the binary form in bytes
    pub const BINARY_LEN: usize = 22;

    /// Ed25519 implicit address from a public key hash
    pub fn ed25519(hash: [u8; 20]) -> Self {
        Address::Implicit {
            curve: Curve::Ed25519,
            hash,
        }
    }

    /// Parse from the Base58Check form (`tz1...`, `KT1...`)
    pub fn from_b58(s: &str) -> Result<Self, PrimitiveError> {
        let (prefix, build): (Prefix, fn([u8; 20]) -> Address) = match s.get(..3) {
            Some("tz1") => (Prefix::TZ1, |h| Address::Implicit { curve: Curve::Ed25519, hash: h }),
            Some("tz2") => (Prefix::TZ2, |h| Address::Implicit { curve: Curve::Secp256k1, hash: h }),
            Some("tz3") => (Prefix::TZ3, |h| Address::Implicit { curve: Curve::P256, hash: h }),
            Some("KT1") => (Prefix::KT1, Address::Originated),
            _ => return Err(PrimitiveError::InvalidAddress(s.to_string())),
        };
        let payload = decode_check(prefix, s)?;
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload);
        Ok(build(hash))
    }

    /// Encode as Base58Check
    pub fn to_b58(&self) -> String {
        let (prefix, hash) = match self {
            Address::Implicit { curve, hash } => (curve.prefix(), hash),
            Address::Originated(hash) => (Prefix::KT1, hash),
        };
        // payload length always matches the prefix
        encode_check(prefix, hash).unwrap_or_default()
    }

    /// Binary form used inside forged operations and packed data
    ///
    /// Implicit: `0x00 || curve tag || hash`. Originated: `0x01 || hash || 0x00`.
    pub fn to_bytes(&self) -> [u8; 22] {
        let mut out = [0u8; 22];
        match self {
            Address::Implicit { curve, hash } => {
                out[0] = 0x00;
                out[1] = curve.tag();
                out[2..].copy_from_slice(hash);
            }
            Address::Originated(hash) => {
                out[0] = 0x01;
                out[1..21].copy_from_slice(hash);
                out[21] = 0x00;
            }
        }
        out
    }

    /// Parse the binary form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() != Self::BINARY_LEN {
            return Err(PrimitiveError::InvalidLength {
                expected: Self::BINARY_LEN,
                got: bytes.len(),
            });
        }
        let mut hash = [0u8; 20];
        match bytes[0] {
            0x00 => {
                let curve = Curve::from_tag(bytes[1])?;
                hash.copy_from_slice(&bytes[2..]);
                Ok(Address::Implicit { curve, hash })
            }
            0x01 => {
                hash.copy_from_slice(&bytes[1..21]);
                Ok(Address::Originated(hash))
            }
            other => Err(PrimitiveError::UnknownAddressTag(other)),
        }
    }

    /// Whether this is a key-controlled account
    pub fn is_implicit(&self) -> bool {
        matches!(self, Address::Implicit { .. })
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_b58())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b58())
    }
}

impl FromStr for Address {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_b58(s)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Address;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Address {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_b58())
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Address::from_b58(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TZ1: &str = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb";
    const TZ1_HASH: &str = "6b82198cb179e8306c1bedd08f12dc863f328886";
    const KT1: &str = "KT18anmnvhqTsgqTwasxpLKYWcLJnGRX3m2D";

    #[test]
    fn test_parse_implicit() {
        let addr = Address::from_b58(TZ1).unwrap();
        assert!(addr.is_implicit());
        match addr {
            Address::Implicit { curve, hash } => {
                assert_eq!(curve, Curve::Ed25519);
                assert_eq!(hex::encode(hash), TZ1_HASH);
            }
            _ => panic!("expected implicit address"),
        }
        assert_eq!(addr.to_string(), TZ1);
    }

    #[test]
    fn test_parse_originated() {
        let addr: Address = KT1.parse().unwrap();
        let expected: [u8; 20] = core::array::from_fn(|i| i as u8);
        assert_eq!(addr, Address::Originated(expected));
        assert!(!addr.is_implicit());
        assert_eq!(addr.to_b58(), KT1);
    }

    #[test]
    fn test_other_curves() {
        let tz2 = Address::from_b58("tz28KEfLTo3wg2wGyJZMjC1MaDA1q68s6tz5").unwrap();
        assert_eq!(tz2, Address::Implicit { curve: Curve::Secp256k1, hash: [0; 20] });
        let tz3 = Address::from_b58("tz3LL3cfMfBV4fPaPZdcj9TjPa3XbvLiXw9V").unwrap();
        assert_eq!(tz3, Address::Implicit { curve: Curve::P256, hash: [0; 20] });
    }

    #[test]
    fn test_binary_form_implicit() {
        let addr = Address::from_b58(TZ1).unwrap();
        let bytes = addr.to_bytes();
        assert_eq!(hex::encode(bytes), format!("0000{}", TZ1_HASH));
        assert_eq!(Address::from_bytes(&bytes).unwrap(), addr);
    }

    #[test]
    fn test_binary_form_originated() {
        let addr = Address::from_b58(KT1).unwrap();
        let bytes = addr.to_bytes();
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes[21], 0x00);
        assert_eq!(Address::from_bytes(&bytes).unwrap(), addr);
    }

    #[test]
    fn test_binary_form_errors() {
        assert!(matches!(
            Address::from_bytes(&[0u8; 21]),
            Err(PrimitiveError::InvalidLength { expected: 22, got: 21 })
        ));
        let mut bytes = [0u8; 22];
        bytes[0] = 0x02;
        assert_eq!(Address::from_bytes(&bytes), Err(PrimitiveError::UnknownAddressTag(2)));
        bytes[0] = 0x00;
        bytes[1] = 0x07;
        assert_eq!(Address::from_bytes(&bytes), Err(PrimitiveError::UnknownAddressTag(7)));
    }

    #[test]
    fn test_reject_unknown_prefix() {
        assert!(matches!(
            Address::from_b58("edpkvGfYw3LyB1UcCahKQk4rF2tvbMUk8GFiTuMjL75uGXrpvKXhjn"),
            Err(PrimitiveError::InvalidAddress(_))
        ));
        assert!(Address::from_b58("").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let addr = Address::from_b58(TZ1).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", TZ1));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"tz1nope\"").is_err());
    }
}
