//! Contract interaction helpers

use std::collections::BTreeMap;
use tez_primitives::{Address, Mutez};

use crate::micheline::{decode, encode_args, script_expr_hash, BigMapId, Micheline, Token};
use crate::{SdkError, TezosClient};

/// An encoded entrypoint call, ready to be put in a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Contract being called
    pub destination: Address,
    /// Entrypoint name as sent to the node
    pub entrypoint: String,
    /// Encoded argument
    pub value: Micheline,
    /// Tez sent along, in mutez
    pub amount: Mutez,
}

impl ContractCall {
    /// Send tez along with the call
    pub fn with_amount(mut self, amount: Mutez) -> Self {
        self.amount = amount;
        self
    }
}

/// Deployed contract: its address, types and entrypoints
#[derive(Debug, Clone)]
pub struct Contract {
    address: Address,
    parameter_type: Micheline,
    storage_type: Micheline,
    entrypoints: BTreeMap<String, Micheline>,
    /// `Left`/`Right` wrapping for entrypoints reached through `default`
    routes: BTreeMap<String, Vec<Side>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Contract {
    /// Load the contract at `address` from the node
    pub async fn at(client: &TezosClient, address: Address) -> Result<Self, SdkError> {
        let script = client.script(&address).await?;
        let entrypoints = client.entrypoints(&address).await?;
        let contract = Self::from_script(address, &script.code, entrypoints)?;
        tracing::debug!(%address, methods = ?contract.methods(), "contract loaded");
        Ok(contract)
    }

    /// Build from the script's code section and the node's entrypoint list
    ///
    /// When `entrypoints` is empty they are derived from the `or` tree of
    /// the parameter type: annotated leaves by name, the rest by position.
    pub fn from_script(
        address: Address,
        code: &Micheline,
        entrypoints: BTreeMap<String, Micheline>,
    ) -> Result<Self, SdkError> {
        let section = |name: &str| -> Result<Micheline, SdkError> {
            let sections = match code {
                Micheline::Seq(items) => items.as_slice(),
                _ => std::slice::from_ref(code),
            };
            sections
                .iter()
                .find(|s| s.is_prim(name))
                .and_then(|s| s.args().first())
                .cloned()
                .ok_or_else(|| SdkError::MissingField(format!("{} section", name)))
        };

        let parameter_type = section("parameter")?;
        let storage_type = section("storage")?;

        let (entrypoints, routes) = if entrypoints.is_empty() {
            derive_entrypoints(&parameter_type)
        } else {
            let routes = entrypoints.keys().map(|name| (name.clone(), Vec::new())).collect();
            (entrypoints, routes)
        };

        Ok(Self {
            address,
            parameter_type,
            storage_type,
            entrypoints,
            routes,
        })
    }

    /// Get the contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Full parameter type
    pub fn parameter_type(&self) -> &Micheline {
        &self.parameter_type
    }

    /// Storage type
    pub fn storage_type(&self) -> &Micheline {
        &self.storage_type
    }

    /// Entrypoints and their argument types
    pub fn entrypoints(&self) -> &BTreeMap<String, Micheline> {
        &self.entrypoints
    }

    /// Entrypoint names
    pub fn methods(&self) -> Vec<&str> {
        self.entrypoints.keys().map(String::as_str).collect()
    }

    /// Type of the storage field annotated `%name`, searching nested pairs
    pub fn storage_field_type(&self, name: &str) -> Option<&Micheline> {
        find_field(&self.storage_type, name)
    }

    /// Encode a call to `entrypoint` with positional arguments
    pub fn call(&self, entrypoint: &str, args: &[Token]) -> Result<ContractCall, SdkError> {
        let ty = self
            .entrypoints
            .get(entrypoint)
            .ok_or_else(|| SdkError::UnknownEntrypoint(entrypoint.to_string()))?;

        let mut value = encode_args(ty, args)?;
        let route = self.routes.get(entrypoint).map(Vec::as_slice).unwrap_or_default();

        let name = if route.is_empty() {
            entrypoint.to_string()
        } else {
            for side in route.iter().rev() {
                let prim = match side {
                    Side::Left => "Left",
                    Side::Right => "Right",
                };
                value = Micheline::prim_args(prim, vec![value]);
            }
            "default".to_string()
        };

        Ok(ContractCall {
            destination: self.address,
            entrypoint: name,
            value,
            amount: 0,
        })
    }

    /// Decode a raw storage value
    pub fn decode_storage(&self, raw: &Micheline) -> Result<Token, SdkError> {
        decode(raw, &self.storage_type)
    }

    /// Fetch and decode the current storage
    pub async fn storage(&self, client: &TezosClient) -> Result<Token, SdkError> {
        let raw = client.storage(&self.address).await?;
        self.decode_storage(&raw)
    }

    /// Look up `key` in big map `id`; `None` when the key is absent
    pub async fn big_map_get(
        &self,
        client: &TezosClient,
        id: BigMapId,
        key: &Token,
        key_type: &Micheline,
        value_type: &Micheline,
    ) -> Result<Option<Token>, SdkError> {
        let hash = script_expr_hash(key, key_type)?;
        match client.big_map_get(id, &hash).await? {
            Some(raw) => decode(&raw, value_type).map(Some),
            None => Ok(None),
        }
    }
}

type Derived = (BTreeMap<String, Micheline>, BTreeMap<String, Vec<Side>>);

fn derive_entrypoints(parameter: &Micheline) -> Derived {
    let mut entrypoints = BTreeMap::new();
    let mut routes = BTreeMap::new();

    if !parameter.is_prim("or") {
        entrypoints.insert("default".to_string(), parameter.clone());
        routes.insert("default".to_string(), Vec::new());
        return (entrypoints, routes);
    }

    let mut leaves = Vec::new();
    collect_or_leaves(parameter, true, &mut Vec::new(), &mut leaves);

    for (index, (leaf, path)) in leaves.into_iter().enumerate() {
        match leaf.field_annot().map(str::to_string) {
            Some(name) => {
                routes.insert(name.clone(), Vec::new());
                entrypoints.insert(name, leaf.clone());
            }
            None => {
                routes.insert(index.to_string(), path);
                entrypoints.insert(index.to_string(), leaf.clone());
            }
        }
    }
    (entrypoints, routes)
}

fn collect_or_leaves<'a>(
    ty: &'a Micheline,
    root: bool,
    path: &mut Vec<Side>,
    out: &mut Vec<(&'a Micheline, Vec<Side>)>,
) {
    let branch = ty.is_prim("or") && ty.args().len() == 2 && (root || ty.field_annot().is_none());
    if !branch {
        out.push((ty, path.clone()));
        return;
    }
    for (side, child) in [(Side::Left, &ty.args()[0]), (Side::Right, &ty.args()[1])] {
        path.push(side);
        collect_or_leaves(child, false, path, out);
        path.pop();
    }
}

fn find_field<'a>(ty: &'a Micheline, name: &str) -> Option<&'a Micheline> {
    if ty.field_annot() == Some(name) {
        return Some(ty);
    }
    if ty.is_prim("pair") {
        return ty.args().iter().find_map(|arg| find_field(arg, name));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KT1: &str = "KT18anmnvhqTsgqTwasxpLKYWcLJnGRX3m2D";

    fn m(value: serde_json::Value) -> Micheline {
        Micheline::from_json(&value).unwrap()
    }

    fn code(parameter: serde_json::Value) -> Micheline {
        m(json!([
            {"prim": "parameter", "args": [parameter]},
            {"prim": "storage", "args": [{"prim": "pair", "args": [
                {"prim": "big_map", "annots": ["%accounts"], "args": [{"prim": "address"}, {"prim": "nat"}]},
                {"prim": "nat", "annots": ["%totalSupply"]}
            ]}]},
            {"prim": "code", "args": [[{"prim": "FAILWITH"}]]}
        ]))
    }

    #[test]
    fn test_named_entrypoints_from_node() {
        let mut node = BTreeMap::new();
        node.insert("mint".to_string(), Micheline::prim("nat"));
        node.insert(
            "approve".to_string(),
            m(json!({"prim": "pair", "args": [{"prim": "address"}, {"prim": "nat"}]})),
        );

        let contract = Contract::from_script(KT1.parse().unwrap(), &code(json!({"prim": "unit"})), node).unwrap();
        assert_eq!(contract.methods(), vec!["approve", "mint"]);

        let call = contract.call("mint", &[Token::from(3u64)]).unwrap();
        assert_eq!(call.entrypoint, "mint");
        assert_eq!(call.value, Micheline::int(3));
        assert_eq!(call.amount, 0);
        assert_eq!(call.destination.to_b58(), KT1);
    }

    #[test]
    fn test_derived_entrypoints_from_annotated_or_tree() {
        let parameter = json!({"prim": "or", "args": [
            {"prim": "nat", "annots": ["%mint"]},
            {"prim": "or", "args": [
                {"prim": "nat", "annots": ["%burn"]},
                {"prim": "pair", "annots": ["%approve"], "args": [{"prim": "address"}, {"prim": "nat"}]}
            ]}
        ]});
        let contract = Contract::from_script(KT1.parse().unwrap(), &code(parameter), BTreeMap::new()).unwrap();
        assert_eq!(contract.methods(), vec!["approve", "burn", "mint"]);

        let call = contract.call("burn", &[Token::from(1u64)]).unwrap();
        assert_eq!(call.entrypoint, "burn");
        assert_eq!(call.value, Micheline::int(1));
    }

    #[test]
    fn test_derived_positional_entrypoints_wrap_default() {
        let parameter = json!({"prim": "or", "args": [
            {"prim": "nat"},
            {"prim": "or", "args": [{"prim": "string"}, {"prim": "unit"}]}
        ]});
        let contract = Contract::from_script(KT1.parse().unwrap(), &code(parameter), BTreeMap::new()).unwrap();
        assert_eq!(contract.methods(), vec!["0", "1", "2"]);

        let call = contract.call("1", &[Token::from("x")]).unwrap();
        assert_eq!(call.entrypoint, "default");
        assert_eq!(
            call.value.to_json(),
            json!({"prim": "Right", "args": [{"prim": "Left", "args": [{"string": "x"}]}]})
        );
    }

    #[test]
    fn test_plain_parameter_is_default() {
        let contract = Contract::from_script(
            KT1.parse().unwrap(),
            &code(json!({"prim": "nat"})),
            BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(contract.methods(), vec!["default"]);
        assert_eq!(contract.call("default", &[Token::from(1u64)]).unwrap().entrypoint, "default");
    }

    #[test]
    fn test_unknown_entrypoint() {
        let contract = Contract::from_script(KT1.parse().unwrap(), &code(json!({"prim": "unit"})), BTreeMap::new()).unwrap();
        assert!(matches!(
            contract.call("transfer", &[]),
            Err(SdkError::UnknownEntrypoint(name)) if name == "transfer"
        ));
    }

    #[test]
    fn test_storage_field_type() {
        let contract = Contract::from_script(KT1.parse().unwrap(), &code(json!({"prim": "unit"})), BTreeMap::new()).unwrap();
        let accounts = contract.storage_field_type("accounts").unwrap();
        assert!(accounts.is_prim("big_map"));
        assert!(contract.storage_field_type("missing").is_none());

        let storage = contract
            .decode_storage(&m(json!({"prim": "Pair", "args": [{"int": "4"}, {"int": "10"}]})))
            .unwrap();
        assert_eq!(storage.field("accounts").and_then(Token::as_big_map), Some(4));
    }

    #[test]
    fn test_missing_sections() {
        let result = Contract::from_script(KT1.parse().unwrap(), &m(json!([])), BTreeMap::new());
        assert!(matches!(result, Err(SdkError::MissingField(_))));
    }

    #[test]
    fn test_call_with_amount() {
        let contract = Contract::from_script(KT1.parse().unwrap(), &code(json!({"prim": "unit"})), BTreeMap::new()).unwrap();
        let call = contract.call("default", &[]).unwrap().with_amount(1_000_000);
        assert_eq!(call.amount, 1_000_000);
        assert_eq!(call.value, Micheline::prim("Unit"));
    }
}
