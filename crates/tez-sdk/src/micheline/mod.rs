//! Michelson data handling
//!
//! This module provides functionality for:
//! - Parsing and rendering the node's JSON Micheline
//! - Decoding values against their types into [`Token`]s
//! - Encoding entrypoint arguments
//! - PACK and script expression hashes for big map lookups
//!
//! # Example
//!
//! ```rust
//! use tez_sdk::micheline::{decode, encode_args, Micheline, Token};
//! use serde_json::json;
//!
//! let ty = Micheline::from_json(&json!({"prim": "pair", "args": [
//!     {"prim": "address", "annots": [":spender"]},
//!     {"prim": "nat", "annots": [":value"]}
//! ]})).unwrap();
//!
//! let spender = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb".parse().unwrap();
//! let value = encode_args(&ty, &[Token::Address(spender), Token::from(10u64)]).unwrap();
//! let back = decode(&value, &ty).unwrap();
//! assert_eq!(back.field("1"), Some(&Token::from(10u64)));
//! ```

mod decode;
mod encode;
mod expr;
mod pack;
mod token;

pub use decode::decode;
pub use encode::{encode_args, encode_value};
pub use expr::Micheline;
pub use pack::{pack, pack_token, script_expr_hash, PACK_TAG};
pub use token::{BigMapId, Token};

use crate::SdkError;

/// Split a pair type into its two halves, reading `pair a b c` as `pair a (pair b c)`
pub(crate) fn split_pair_type(ty: &Micheline) -> Result<(Micheline, Micheline), SdkError> {
    split_comb(ty.args(), "pair").ok_or_else(|| {
        SdkError::Micheline(format!("pair type needs at least two arguments: {}", ty.to_json()))
    })
}

/// Split a pair value given as `Pair a b`, `Pair a b c` or `{a; b; c}`
pub(crate) fn split_pair_value(value: &Micheline) -> Result<(Micheline, Micheline), SdkError> {
    let split = match value {
        Micheline::Prim { prim, args, .. } if prim == "Pair" => split_comb(args, "Pair"),
        Micheline::Seq(items) => split_comb(items, "Pair"),
        _ => None,
    };
    split.ok_or_else(|| SdkError::Micheline(format!("expected a pair, got {}", value.to_json())))
}

fn split_comb(items: &[Micheline], pair: &str) -> Option<(Micheline, Micheline)> {
    match items {
        [left, right] => Some((left.clone(), right.clone())),
        [left, rest @ ..] if rest.len() > 1 => {
            Some((left.clone(), Micheline::prim_args(pair, rest.to_vec())))
        }
        _ => None,
    }
}
