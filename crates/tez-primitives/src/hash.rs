//! Base58-encoded hash types returned by the node

use std::fmt;
use std::str::FromStr;

use crate::base58::{decode_check, encode_check, Prefix};
use crate::PrimitiveError;

macro_rules! b58_hash {
    ($(#[$doc:meta])* $name:ident, $prefix:expr, $len:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Size in bytes
            pub const LEN: usize = $len;

            /// Create from raw bytes
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }

            /// Parse from the Base58Check form
            pub fn from_b58(s: &str) -> Result<Self, PrimitiveError> {
                let payload = decode_check($prefix, s)?;
                let mut bytes = [0u8; $len];
                bytes.copy_from_slice(&payload);
                Ok($name(bytes))
            }

            /// Encode as Base58Check
            pub fn to_b58(&self) -> String {
                encode_check($prefix, &self.0).unwrap_or_default()
            }

            /// Get as bytes
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_b58())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_b58())
            }
        }

        impl FromStr for $name {
            type Err = PrimitiveError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::from_b58(s)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_b58())
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                $name::from_b58(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

b58_hash!(
    /// Operation hash (`o...`)
    OperationHash, Prefix::OPERATION, 32
);

b58_hash!(
    /// Block hash (`B...`)
    BlockHash, Prefix::BLOCK, 32
);

b58_hash!(
    /// Chain identifier (`Net...`)
    ChainId, Prefix::CHAIN_ID, 4
);

b58_hash!(
    /// Script expression hash (`expr...`), the key under which big_map values are stored
    ScriptExprHash, Prefix::SCRIPT_EXPR, 32
);
