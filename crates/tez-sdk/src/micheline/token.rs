//! Typed Michelson values

use num_bigint::{BigInt, BigUint};
use std::collections::BTreeMap;
use tez_primitives::Address;

use super::Micheline;

/// Identifier of a big_map in the node's context
pub type BigMapId = i64;

/// A Michelson value decoded against its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `int`, `timestamp` given as seconds
    Int(BigInt),
    /// `nat`, `mutez`
    Nat(BigUint),
    /// `string` and other string-rendered scalars (`key`, `signature`, ...)
    String(String),
    /// `bytes`
    Bytes(Vec<u8>),
    /// `bool`
    Bool(bool),
    /// `address`
    Address(Address),
    /// `unit`
    Unit,
    /// `option`
    Option(Option<Box<Token>>),
    /// `list`, `set`
    List(Vec<Token>),
    /// `map`, or a `big_map` given inline
    Map(Vec<(Token, Token)>),
    /// Reference to a `big_map` stored in the context
    BigMap(BigMapId),
    /// Flattened `pair`
    Record(BTreeMap<String, Token>),
    /// Left branch of an `or`
    Left(Box<Token>),
    /// Right branch of an `or`
    Right(Box<Token>),
    /// Value kept as raw Micheline (lambdas, operations, ...)
    Raw(Micheline),
}

impl Token {
    /// Natural number, if this is one (a non-negative `Int` also qualifies)
    pub fn as_nat(&self) -> Option<BigUint> {
        match self {
            Token::Nat(n) => Some(n.clone()),
            Token::Int(i) => i.to_biguint(),
            _ => None,
        }
    }

    /// String contents
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    /// Address value
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Token::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Inline map entries
    pub fn as_map(&self) -> Option<&[(Token, Token)]> {
        match self {
            Token::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Big map identifier
    pub fn as_big_map(&self) -> Option<BigMapId> {
        match self {
            Token::BigMap(id) => Some(*id),
            _ => None,
        }
    }

    /// Named or positional field of a record
    pub fn field(&self, name: &str) -> Option<&Token> {
        match self {
            Token::Record(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl From<Address> for Token {
    fn from(address: Address) -> Self {
        Token::Address(address)
    }
}

impl From<BigUint> for Token {
    fn from(n: BigUint) -> Self {
        Token::Nat(n)
    }
}

impl From<u64> for Token {
    fn from(n: u64) -> Self {
        Token::Nat(BigUint::from(n))
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token::String(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token::String(s)
    }
}

impl From<bool> for Token {
    fn from(b: bool) -> Self {
        Token::Bool(b)
    }
}
