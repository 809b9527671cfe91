//! PACK serialization and script expression hashes
//!
//! Big map values are stored under `blake2b_256(PACK(key))`, rendered with
//! the `expr` prefix. PACK is `0x05` followed by the binary Micheline
//! encoding of the value in its optimized form (addresses and key hashes as
//! bytes).

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use tez_crypto::blake2b_256;
use tez_primitives::{Address, ScriptExprHash};

use super::{encode_value, split_pair_type, Micheline, Token};
use crate::SdkError;

/// Leading byte of packed data
pub const PACK_TAG: u8 = 0x05;

/// Michelson primitives in binary tag order
const PRIMITIVES: [&str; 118] = [
    "parameter", "storage", "code", "False", "Elt", "Left", "None", "Pair", "Right", "Some",
    "True", "Unit", "PACK", "UNPACK", "BLAKE2B", "SHA256", "SHA512", "ABS", "ADD", "AMOUNT",
    "AND", "BALANCE", "CAR", "CDR", "CHECK_SIGNATURE", "COMPARE", "CONCAT", "CONS",
    "CREATE_ACCOUNT", "CREATE_CONTRACT", "IMPLICIT_ACCOUNT", "DIP", "DROP", "DUP", "EDIV",
    "EMPTY_MAP", "EMPTY_SET", "EQ", "EXEC", "FAILWITH", "GE", "GET", "GT", "HASH_KEY", "IF",
    "IF_CONS", "IF_LEFT", "IF_NONE", "INT", "LAMBDA", "LE", "LEFT", "LOOP", "LSL", "LSR", "LT",
    "MAP", "MEM", "MUL", "NEG", "NEQ", "NIL", "NONE", "NOT", "NOW", "OR", "PAIR", "PUSH",
    "RIGHT", "SIZE", "SOME", "SOURCE", "SENDER", "SELF", "STEPS_TO_QUOTA", "SUB", "SWAP",
    "TRANSFER_TOKENS", "SET_DELEGATE", "UNIT", "UPDATE", "XOR", "ITER", "LOOP_LEFT", "ADDRESS",
    "CONTRACT", "ISNAT", "CAST", "RENAME", "bool", "contract", "int", "key", "key_hash",
    "lambda", "list", "map", "big_map", "nat", "option", "or", "pair", "set", "signature",
    "string", "bytes", "mutez", "timestamp", "unit", "operation", "address", "SLICE", "DIG",
    "DUG", "EMPTY_BIG_MAP", "APPLY", "chain_id", "CHAIN_ID",
];

/// PACK a value of type `ty`
pub fn pack(value: &Micheline, ty: &Micheline) -> Result<Vec<u8>, SdkError> {
    let optimized = optimize(value, ty)?;
    let mut out = vec![PACK_TAG];
    write_node(&optimized, &mut out)?;
    Ok(out)
}

/// PACK a typed value
pub fn pack_token(token: &Token, ty: &Micheline) -> Result<Vec<u8>, SdkError> {
    pack(&encode_value(token, ty)?, ty)
}

/// Hash under which a big map stores the value for `key`
pub fn script_expr_hash(key: &Token, key_ty: &Micheline) -> Result<ScriptExprHash, SdkError> {
    let packed = pack_token(key, key_ty)?;
    Ok(ScriptExprHash::from_bytes(blake2b_256(&packed)))
}

// ==================== Optimized Form ====================

fn optimize(value: &Micheline, ty: &Micheline) -> Result<Micheline, SdkError> {
    let prim = match ty.prim_name() {
        Some(prim) => prim,
        None => return Ok(value.clone()),
    };

    let optimized = match (prim, value) {
        ("address" | "contract", Micheline::String(s)) => {
            let (base, entrypoint) = match s.split_once('%') {
                Some((base, entrypoint)) => (base, Some(entrypoint)),
                None => (s.as_str(), None),
            };
            let mut bytes = Address::from_b58(base)?.to_bytes().to_vec();
            if let Some(entrypoint) = entrypoint {
                bytes.extend_from_slice(entrypoint.as_bytes());
            }
            Micheline::Bytes(bytes)
        }
        ("key_hash", Micheline::String(s)) => {
            let address = Address::from_b58(s)?;
            if !address.is_implicit() {
                return Err(SdkError::Micheline(format!("not a key hash: {}", s)));
            }
            // drop the implicit/originated tag, keep curve tag and hash
            Micheline::Bytes(address.to_bytes()[1..].to_vec())
        }
        ("pair", _) => {
            let (left_ty, right_ty) = split_pair_type(ty)?;
            let (left, right) = super::split_pair_value(value)?;
            Micheline::prim_args("Pair", vec![optimize(&left, &left_ty)?, optimize(&right, &right_ty)?])
        }
        ("option", Micheline::Prim { prim: p, args, .. }) if p == "Some" && args.len() == 1 => {
            Micheline::prim_args("Some", vec![optimize(&args[0], ty.arg(0)?)?])
        }
        ("or", Micheline::Prim { prim: p, args, .. }) if p == "Left" && args.len() == 1 => {
            Micheline::prim_args("Left", vec![optimize(&args[0], ty.arg(0)?)?])
        }
        ("or", Micheline::Prim { prim: p, args, .. }) if p == "Right" && args.len() == 1 => {
            Micheline::prim_args("Right", vec![optimize(&args[0], ty.arg(1)?)?])
        }
        ("list" | "set", Micheline::Seq(items)) => {
            let item_ty = ty.arg(0)?;
            Micheline::Seq(items.iter().map(|i| optimize(i, item_ty)).collect::<Result<_, _>>()?)
        }
        ("map" | "big_map", Micheline::Seq(items)) => {
            let (key_ty, value_ty) = (ty.arg(0)?, ty.arg(1)?);
            Micheline::Seq(
                items
                    .iter()
                    .map(|elt| {
                        Ok(Micheline::prim_args(
                            "Elt",
                            vec![optimize(elt.arg(0)?, key_ty)?, optimize(elt.arg(1)?, value_ty)?],
                        ))
                    })
                    .collect::<Result<_, SdkError>>()?,
            )
        }
        _ => value.clone(),
    };
    Ok(optimized)
}

// ==================== Binary Encoding ====================

fn write_node(node: &Micheline, out: &mut Vec<u8>) -> Result<(), SdkError> {
    match node {
        Micheline::Int(i) => {
            out.push(0x00);
            write_zarith(i, out);
        }
        Micheline::String(s) => {
            out.push(0x01);
            write_len_prefixed(s.as_bytes(), out)?;
        }
        Micheline::Seq(items) => {
            out.push(0x02);
            let mut body = Vec::new();
            for item in items {
                write_node(item, &mut body)?;
            }
            write_len_prefixed(&body, out)?;
        }
        Micheline::Bytes(b) => {
            out.push(0x0a);
            write_len_prefixed(b, out)?;
        }
        Micheline::Prim { prim, args, annots } => {
            let code = PRIMITIVES
                .iter()
                .position(|p| *p == prim.as_str())
                .ok_or_else(|| SdkError::Micheline(format!("unknown primitive: {}", prim)))?;
            let annotated = !annots.is_empty();

            let tag = match (args.len(), annotated) {
                (0, false) => 0x03,
                (0, true) => 0x04,
                (1, false) => 0x05,
                (1, true) => 0x06,
                (2, false) => 0x07,
                (2, true) => 0x08,
                _ => 0x09,
            };
            out.push(tag);
            out.push(code as u8);

            if tag == 0x09 {
                let mut body = Vec::new();
                for arg in args {
                    write_node(arg, &mut body)?;
                }
                write_len_prefixed(&body, out)?;
                write_len_prefixed(annots.join(" ").as_bytes(), out)?;
            } else {
                for arg in args {
                    write_node(arg, out)?;
                }
                if annotated {
                    write_len_prefixed(annots.join(" ").as_bytes(), out)?;
                }
            }
        }
    }
    Ok(())
}

fn write_len_prefixed(data: &[u8], out: &mut Vec<u8>) -> Result<(), SdkError> {
    let len = u32::try_from(data.len())
        .map_err(|_| SdkError::Micheline(format!("node too large: {} bytes", data.len())))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(data);
    Ok(())
}

/// Signed zarith: 6 value bits and a sign bit in the first byte, 7 bits after
fn write_zarith(value: &BigInt, out: &mut Vec<u8>) {
    let mut n: BigUint = value.magnitude().clone();

    let mut byte = low_bits(&n, 0x3f);
    n >>= 6usize;
    if value.sign() == Sign::Minus {
        byte |= 0x40;
    }
    if !n.is_zero() {
        byte |= 0x80;
    }
    out.push(byte);

    while !n.is_zero() {
        let mut byte = low_bits(&n, 0x7f);
        n >>= 7usize;
        if !n.is_zero() {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

fn low_bits(n: &BigUint, mask: u8) -> u8 {
    n.to_bytes_le().first().copied().unwrap_or(0) & mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn m(value: serde_json::Value) -> Micheline {
        Micheline::from_json(&value).unwrap()
    }

    fn packed_int(i: i64) -> String {
        hex::encode(pack(&Micheline::int(i), &Micheline::prim("int")).unwrap())
    }

    #[test]
    fn test_pack_ints() {
        assert_eq!(packed_int(0), "050000");
        assert_eq!(packed_int(1), "050001");
        assert_eq!(packed_int(-64), "0500c001");
        assert_eq!(packed_int(1_000_000), "050080897a");

        let big = Micheline::Int("2000000000000000000".parse().unwrap());
        assert_eq!(
            hex::encode(pack(&big, &Micheline::prim("nat")).unwrap()),
            "05008080c0ece9d9b6c137"
        );
    }

    #[test]
    fn test_pack_pair_and_seq() {
        let ty = m(json!({"prim": "pair", "args": [{"prim": "string"}, {"prim": "nat"}]}));
        let value = m(json!({"prim": "Pair", "args": [{"string": "a"}, {"int": "1"}]}));
        assert_eq!(hex::encode(pack(&value, &ty).unwrap()), "0507070100000001610001");

        let ty = m(json!({"prim": "list", "args": [{"prim": "nat"}]}));
        let value = m(json!([{"int": "1"}, {"int": "2"}]));
        assert_eq!(hex::encode(pack(&value, &ty).unwrap()), "05020000000400010002");
    }

    #[test]
    fn test_pack_option_unit() {
        let ty = m(json!({"prim": "option", "args": [{"prim": "unit"}]}));
        let value = m(json!({"prim": "Some", "args": [{"prim": "Unit"}]}));
        assert_eq!(hex::encode(pack(&value, &ty).unwrap()), "050509030b");
    }

    #[test]
    fn test_pack_address_uses_binary_form() {
        let key = Micheline::string("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb");
        assert_eq!(
            hex::encode(pack(&key, &Micheline::prim("address")).unwrap()),
            "050a0000001600006b82198cb179e8306c1bedd08f12dc863f328886"
        );
    }

    #[test]
    fn test_script_expr_hash_vectors() {
        let address = Micheline::prim("address");
        let tz1: Address = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb".parse().unwrap();
        assert_eq!(
            script_expr_hash(&Token::from(tz1), &address).unwrap().to_b58(),
            "exprtr3iA2ZhFDtnJZDS1nVxJYeXGWw2AWziVAD7DZf7kxsHmNLZBB"
        );

        let kt1: Address = "KT18anmnvhqTsgqTwasxpLKYWcLJnGRX3m2D".parse().unwrap();
        assert_eq!(
            script_expr_hash(&Token::from(kt1), &address).unwrap().to_b58(),
            "expruoo5fVDtTumb8vcXYAeF8bCNwKbdDdvstJEgNweecF7eGaek6N"
        );

        let nat = Micheline::prim("nat");
        assert_eq!(
            script_expr_hash(&Token::from(0u64), &nat).unwrap().to_b58(),
            "exprtZBwZUeYYYfUs9B9Rg2ywHezVHnCCnmF9WsDQVrs582dSK63dC"
        );
        assert_eq!(
            script_expr_hash(&Token::from(1u64), &nat).unwrap().to_b58(),
            "expru2dKqDfZG8hu4wNGkiyunvq2hdSKuVYtcKta7BWP6Q18oNxKjS"
        );
    }

    #[test]
    fn test_pack_annotated_and_variadic_prims() {
        let annotated = Micheline::prim("nat").annotated("%balance");
        let mut out = Vec::new();
        write_node(&annotated, &mut out).unwrap();
        assert_eq!(hex::encode(out), "0462000000082562616c616e6365");

        let triple = Micheline::prim_args("Pair", vec![Micheline::int(1), Micheline::int(2), Micheline::int(3)]);
        let mut out = Vec::new();
        write_node(&triple, &mut out).unwrap();
        assert_eq!(hex::encode(out), "09070000000600010002000300000000");
    }

    #[test]
    fn test_unknown_primitive() {
        let mut out = Vec::new();
        assert!(write_node(&Micheline::prim("NOT_A_PRIM"), &mut out).is_err());
    }
}
