//! Untyped Micheline expressions and their RPC JSON form

use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::SdkError;

/// Micheline expression as exchanged with the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Micheline {
    /// Arbitrary precision integer, `{"int": "..."}`
    Int(BigInt),
    /// String literal, `{"string": "..."}`
    String(String),
    /// Byte literal, `{"bytes": "<hex>"}`
    Bytes(Vec<u8>),
    /// Primitive application, `{"prim": ..., "args": [...], "annots": [...]}`
    Prim {
        /// Primitive name (`pair`, `Pair`, `nat`, ...)
        prim: String,
        /// Arguments
        args: Vec<Micheline>,
        /// Annotations including their sigil (`%field`, `:type`)
        annots: Vec<String>,
    },
    /// Sequence, a JSON array
    Seq(Vec<Micheline>),
}

impl Micheline {
    /// Primitive without arguments
    pub fn prim(name: &str) -> Self {
        Self::prim_args(name, Vec::new())
    }

    /// Primitive with arguments
    pub fn prim_args(name: &str, args: Vec<Micheline>) -> Self {
        Micheline::Prim {
            prim: name.to_string(),
            args,
            annots: Vec::new(),
        }
    }

    /// Add an annotation
    pub fn annotated(mut self, annot: &str) -> Self {
        if let Micheline::Prim { annots, .. } = &mut self {
            annots.push(annot.to_string());
        }
        self
    }

    /// Integer literal
    pub fn int(value: impl Into<BigInt>) -> Self {
        Micheline::Int(value.into())
    }

    /// String literal
    pub fn string(value: impl Into<String>) -> Self {
        Micheline::String(value.into())
    }

    /// Primitive name, if this is a primitive application
    pub fn prim_name(&self) -> Option<&str> {
        match self {
            Micheline::Prim { prim, .. } => Some(prim),
            _ => None,
        }
    }

    /// Whether this is the primitive `name`
    pub fn is_prim(&self, name: &str) -> bool {
        self.prim_name() == Some(name)
    }

    /// Primitive arguments (empty for non-primitives)
    pub fn args(&self) -> &[Micheline] {
        match self {
            Micheline::Prim { args, .. } => args,
            _ => &[],
        }
    }

    /// Field annotation without its `%` sigil
    pub fn field_annot(&self) -> Option<&str> {
        match self {
            Micheline::Prim { annots, .. } => annots
                .iter()
                .find_map(|a| a.strip_prefix('%'))
                .filter(|a| !a.is_empty()),
            _ => None,
        }
    }

    /// The `n`th argument, or a decoding error naming the primitive
    pub(crate) fn arg(&self, n: usize) -> Result<&Micheline, SdkError> {
        self.args().get(n).ok_or_else(|| {
            SdkError::Micheline(format!(
                "{} is missing argument {}",
                self.prim_name().unwrap_or("expression"),
                n
            ))
        })
    }

    /// Parse the RPC JSON form
    pub fn from_json(value: &Value) -> Result<Self, SdkError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(Micheline::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Micheline::Seq),
            Value::Object(map) => from_json_object(map),
            other => Err(SdkError::Micheline(format!("not a Micheline node: {}", other))),
        }
    }

    /// Render the RPC JSON form
    pub fn to_json(&self) -> Value {
        match self {
            Micheline::Int(i) => serde_json::json!({ "int": i.to_string() }),
            Micheline::String(s) => serde_json::json!({ "string": s }),
            Micheline::Bytes(b) => serde_json::json!({ "bytes": hex::encode(b) }),
            Micheline::Seq(items) => Value::Array(items.iter().map(Micheline::to_json).collect()),
            Micheline::Prim { prim, args, annots } => {
                let mut map = Map::new();
                map.insert("prim".to_string(), Value::String(prim.clone()));
                if !args.is_empty() {
                    map.insert(
                        "args".to_string(),
                        Value::Array(args.iter().map(Micheline::to_json).collect()),
                    );
                }
                if !annots.is_empty() {
                    map.insert(
                        "annots".to_string(),
                        Value::Array(annots.iter().cloned().map(Value::String).collect()),
                    );
                }
                Value::Object(map)
            }
        }
    }
}

fn from_json_object(map: &Map<String, Value>) -> Result<Micheline, SdkError> {
    if let Some(int) = map.get("int") {
        let text = int
            .as_str()
            .ok_or_else(|| SdkError::Micheline("int literal must be a string".to_string()))?;
        let value = text
            .parse::<BigInt>()
            .map_err(|_| SdkError::Micheline(format!("invalid int literal: {}", text)))?;
        return Ok(Micheline::Int(value));
    }
    if let Some(s) = map.get("string") {
        let s = s
            .as_str()
            .ok_or_else(|| SdkError::Micheline("string literal must be a string".to_string()))?;
        return Ok(Micheline::String(s.to_string()));
    }
    if let Some(b) = map.get("bytes") {
        let b = b
            .as_str()
            .ok_or_else(|| SdkError::Micheline("bytes literal must be a string".to_string()))?;
        return Ok(Micheline::Bytes(hex::decode(b)?));
    }

    let prim = map
        .get("prim")
        .and_then(Value::as_str)
        .ok_or_else(|| SdkError::Micheline(format!("unrecognized node: {}", Value::Object(map.clone()))))?;

    let args = match map.get("args") {
        Some(Value::Array(items)) => items
            .iter()
            .map(Micheline::from_json)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(SdkError::Micheline("args must be an array".to_string())),
        None => Vec::new(),
    };

    let annots = match map.get("annots") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|a| {
                a.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| SdkError::Micheline("annotation must be a string".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(SdkError::Micheline("annots must be an array".to_string())),
        None => Vec::new(),
    };

    Ok(Micheline::Prim {
        prim: prim.to_string(),
        args,
        annots,
    })
}

impl Serialize for Micheline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Micheline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Micheline::from_json(&value).map_err(serde::de::Error::custom)
    }
}
