//! Encoding typed values and entrypoint arguments into Micheline

use num_bigint::{BigInt, Sign};
use std::collections::BTreeMap;

use super::{split_pair_type, Micheline, Token};
use crate::SdkError;

/// Encode positional entrypoint arguments against the parameter type
///
/// Arguments fill the leaves of the pair tree left to right, so
/// `transfer(from, to, value)` against `pair address (pair address nat)`
/// becomes `Pair from (Pair to value)`.
pub fn encode_args(param_ty: &Micheline, args: &[Token]) -> Result<Micheline, SdkError> {
    if param_ty.is_prim("unit") && args.is_empty() {
        return Ok(Micheline::prim("Unit"));
    }

    let expected = leaf_count(param_ty);
    if args.len() != expected {
        return Err(SdkError::Micheline(format!(
            "expected {} arguments, got {}",
            expected,
            args.len()
        )));
    }

    let mut args = args.iter();
    fill_leaves(param_ty, &mut args)
}

fn leaf_count(ty: &Micheline) -> usize {
    match split_pair_type(ty) {
        Ok((left, right)) if ty.is_prim("pair") => leaf_count(&left) + leaf_count(&right),
        _ => 1,
    }
}

fn fill_leaves<'a>(
    ty: &Micheline,
    args: &mut impl Iterator<Item = &'a Token>,
) -> Result<Micheline, SdkError> {
    if ty.is_prim("pair") {
        let (left, right) = split_pair_type(ty)?;
        let left = fill_leaves(&left, args)?;
        let right = fill_leaves(&right, args)?;
        return Ok(Micheline::prim_args("Pair", vec![left, right]));
    }

    let token = args
        .next()
        .ok_or_else(|| SdkError::Micheline("not enough arguments".to_string()))?;
    encode_value(token, ty)
}

/// Encode a single typed value
pub fn encode_value(token: &Token, ty: &Micheline) -> Result<Micheline, SdkError> {
    let prim = ty
        .prim_name()
        .ok_or_else(|| SdkError::Micheline(format!("not a type: {:?}", ty)))?;

    let encoded = match (prim, token) {
        (_, Token::Raw(raw)) => raw.clone(),
        ("nat" | "mutez", Token::Nat(n)) => Micheline::Int(BigInt::from(n.clone())),
        ("nat" | "mutez", Token::Int(i)) if i.sign() != Sign::Minus => Micheline::Int(i.clone()),
        ("int" | "timestamp", Token::Int(i)) => Micheline::Int(i.clone()),
        ("int", Token::Nat(n)) => Micheline::Int(BigInt::from(n.clone())),
        (
            "string" | "timestamp" | "address" | "contract" | "key" | "key_hash" | "signature"
            | "chain_id",
            Token::String(s),
        ) => Micheline::String(s.clone()),
        ("address" | "contract", Token::Address(a)) => Micheline::String(a.to_b58()),
        ("key_hash", Token::Address(a)) if a.is_implicit() => Micheline::String(a.to_b58()),
        ("bytes" | "key" | "key_hash" | "signature" | "chain_id", Token::Bytes(b)) => {
            Micheline::Bytes(b.clone())
        }
        ("bool", Token::Bool(true)) => Micheline::prim("True"),
        ("bool", Token::Bool(false)) => Micheline::prim("False"),
        ("unit", Token::Unit) => Micheline::prim("Unit"),
        ("option", Token::Option(None)) => Micheline::prim("None"),
        ("option", Token::Option(Some(inner))) => {
            Micheline::prim_args("Some", vec![encode_value(inner, ty.arg(0)?)?])
        }
        ("list" | "set", Token::List(items)) => {
            let item_ty = ty.arg(0)?;
            Micheline::Seq(
                items
                    .iter()
                    .map(|item| encode_value(item, item_ty))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
        ("map" | "big_map", Token::Map(entries)) => {
            let key_ty = ty.arg(0)?;
            let value_ty = ty.arg(1)?;
            Micheline::Seq(
                entries
                    .iter()
                    .map(|(k, v)| {
                        Ok(Micheline::prim_args(
                            "Elt",
                            vec![encode_value(k, key_ty)?, encode_value(v, value_ty)?],
                        ))
                    })
                    .collect::<Result<Vec<_>, SdkError>>()?,
            )
        }
        ("big_map", Token::BigMap(id)) => Micheline::int(*id),
        ("or", Token::Left(inner)) => Micheline::prim_args("Left", vec![encode_value(inner, ty.arg(0)?)?]),
        ("or", Token::Right(inner)) => Micheline::prim_args("Right", vec![encode_value(inner, ty.arg(1)?)?]),
        ("pair", Token::Record(fields)) => {
            let mut position = 0;
            encode_record(fields, ty, &mut position)?
        }
        _ => {
            return Err(SdkError::Micheline(format!(
                "cannot encode {:?} as {}",
                token, prim
            )))
        }
    };
    Ok(encoded)
}

/// Inverse of the record flattening done by [`decode`](super::decode)
fn encode_record(
    fields: &BTreeMap<String, Token>,
    ty: &Micheline,
    position: &mut usize,
) -> Result<Micheline, SdkError> {
    let (left_ty, right_ty) = split_pair_type(ty)?;
    let mut children = Vec::with_capacity(2);

    for child_ty in [&left_ty, &right_ty] {
        let child = match child_ty.field_annot() {
            None if child_ty.is_prim("pair") => encode_record(fields, child_ty, position)?,
            annot => {
                let key = annot.map(str::to_string).unwrap_or_else(|| position.to_string());
                *position += 1;
                let token = fields
                    .get(&key)
                    .ok_or_else(|| SdkError::Micheline(format!("record is missing field {}", key)))?;
                encode_value(token, child_ty)?
            }
        };
        children.push(child);
    }
    Ok(Micheline::prim_args("Pair", children))
}
