//! Decoding Micheline values against their types

use num_traits::ToPrimitive;
use std::collections::BTreeMap;
use tez_primitives::Address;

use super::{split_pair_type, split_pair_value, Micheline, Token};
use crate::SdkError;

/// Decode `value` using `ty`
///
/// Pairs flatten into a [`Token::Record`]: annotated children become named
/// fields, un-annotated nested pairs are inlined into the parent and
/// un-annotated leaves are keyed by their position among the leaves.
pub fn decode(value: &Micheline, ty: &Micheline) -> Result<Token, SdkError> {
    let prim = ty
        .prim_name()
        .ok_or_else(|| SdkError::Micheline(format!("not a type: {:?}", ty)))?;

    match (prim, value) {
        ("nat" | "mutez", Micheline::Int(i)) => i
            .to_biguint()
            .map(Token::Nat)
            .ok_or_else(|| SdkError::Micheline(format!("negative {}: {}", prim, i))),
        ("int" | "timestamp", Micheline::Int(i)) => Ok(Token::Int(i.clone())),
        ("address", Micheline::String(s)) => {
            // drop an entrypoint suffix, `KT1...%transfer`
            let base = s.split('%').next().unwrap_or(s);
            Ok(Token::Address(Address::from_b58(base)?))
        }
        ("address", Micheline::Bytes(b)) => {
            let head = b.get(..Address::BINARY_LEN).ok_or_else(|| {
                SdkError::Micheline(format!("address needs {} bytes, got {}", Address::BINARY_LEN, b.len()))
            })?;
            Ok(Token::Address(Address::from_bytes(head)?))
        }
        (
            "string" | "timestamp" | "key" | "key_hash" | "signature" | "chain_id" | "contract",
            Micheline::String(s),
        ) => Ok(Token::String(s.clone())),
        ("bytes" | "key" | "key_hash" | "signature" | "chain_id" | "contract", Micheline::Bytes(b)) => {
            Ok(Token::Bytes(b.clone()))
        }
        ("bool", Micheline::Prim { prim: v, .. }) if v == "True" => Ok(Token::Bool(true)),
        ("bool", Micheline::Prim { prim: v, .. }) if v == "False" => Ok(Token::Bool(false)),
        ("unit", Micheline::Prim { prim: v, .. }) if v == "Unit" => Ok(Token::Unit),
        ("option", Micheline::Prim { prim: v, .. }) if v == "None" => Ok(Token::Option(None)),
        ("option", Micheline::Prim { prim: v, .. }) if v == "Some" => {
            let inner = decode(value.arg(0)?, ty.arg(0)?)?;
            Ok(Token::Option(Some(Box::new(inner))))
        }
        ("list" | "set", Micheline::Seq(items)) => {
            let item_ty = ty.arg(0)?;
            items
                .iter()
                .map(|item| decode(item, item_ty))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::List)
        }
        ("map" | "big_map", Micheline::Seq(items)) => decode_map(items, ty).map(Token::Map),
        ("big_map", Micheline::Int(id)) => id
            .to_i64()
            .map(Token::BigMap)
            .ok_or_else(|| SdkError::Micheline(format!("big_map id out of range: {}", id))),
        ("pair", _) => {
            let mut fields = BTreeMap::new();
            let mut position = 0;
            flatten_pair(value, ty, &mut fields, &mut position)?;
            Ok(Token::Record(fields))
        }
        ("or", Micheline::Prim { prim: v, .. }) if v == "Left" => {
            Ok(Token::Left(Box::new(decode(value.arg(0)?, ty.arg(0)?)?)))
        }
        ("or", Micheline::Prim { prim: v, .. }) if v == "Right" => {
            Ok(Token::Right(Box::new(decode(value.arg(0)?, ty.arg(1)?)?)))
        }
        (
            "nat" | "mutez" | "int" | "address" | "string" | "key" | "key_hash" | "signature"
            | "chain_id" | "contract" | "timestamp" | "bytes" | "bool" | "unit" | "option"
            | "list" | "set" | "map" | "big_map" | "or",
            _,
        ) => Err(SdkError::Micheline(format!(
            "value {} does not match type {}",
            value.to_json(),
            prim
        ))),
        _ => Ok(Token::Raw(value.clone())),
    }
}

fn decode_map(items: &[Micheline], ty: &Micheline) -> Result<Vec<(Token, Token)>, SdkError> {
    let key_ty = ty.arg(0)?;
    let value_ty = ty.arg(1)?;
    items
        .iter()
        .map(|item| {
            if !item.is_prim("Elt") {
                return Err(SdkError::Micheline(format!("expected Elt, got {}", item.to_json())));
            }
            Ok((decode(item.arg(0)?, key_ty)?, decode(item.arg(1)?, value_ty)?))
        })
        .collect()
}

fn flatten_pair(
    value: &Micheline,
    ty: &Micheline,
    fields: &mut BTreeMap<String, Token>,
    position: &mut usize,
) -> Result<(), SdkError> {
    let (left_ty, right_ty) = split_pair_type(ty)?;
    let (left, right) = split_pair_value(value)?;

    for (child, child_ty) in [(&left, &left_ty), (&right, &right_ty)] {
        match child_ty.field_annot() {
            None if child_ty.is_prim("pair") => flatten_pair(child, child_ty, fields, position)?,
            Some(name) => {
                fields.insert(name.to_string(), decode(child, child_ty)?);
                *position += 1;
            }
            None => {
                fields.insert(position.to_string(), decode(child, child_ty)?);
                *position += 1;
            }
        }
    }
    Ok(())
}
