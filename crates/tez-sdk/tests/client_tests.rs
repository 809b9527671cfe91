//! Client integration tests for tez-sdk
//!
//! Tests client creation, RPC wrappers, contract loading and the
//! simulate/forge/sign/inject pipeline against canned node responses.

use serde_json::{json, Value};
use tez_sdk::micheline::Token;
use tez_sdk::{Address, Contract, HttpMethod, MockTransport, SdkError, TezosClient, Wallet};

const HEAD: &str = "/chains/main/blocks/head";
const KT1: &str = "KT18anmnvhqTsgqTwasxpLKYWcLJnGRX3m2D";

const FUNDRAISER_WORDS: &str =
    "shrug lecture spoil buzz lake solar jar grant patch cradle pepper shallow dish ribbon hungry";
const FUNDRAISER_PKH: &str = "tz1eMbUHzad9RS1HiiJ7dwFivUyRMqtDbiLg";

fn fundraiser_wallet() -> Wallet {
    let words: Vec<&str> = FUNDRAISER_WORDS.split(' ').collect();
    Wallet::from_fundraiser(&words, "xyzabcde.tezos@tezos.example.org", "Pw3xAmpl3")
}

fn contract_path(address: &str, resource: &str) -> String {
    format!("{}/context/contracts/{}/{}", HEAD, address, resource)
}

fn token_script() -> Value {
    json!({
        "code": [
            {"prim": "parameter", "args": [{"prim": "or", "args": [
                {"prim": "nat", "annots": ["%mint"]},
                {"prim": "pair", "annots": ["%transfer"], "args": [
                    {"prim": "address", "annots": [":from"]},
                    {"prim": "pair", "args": [{"prim": "address", "annots": [":to"]}, {"prim": "nat", "annots": [":value"]}]}
                ]}
            ]}]},
            {"prim": "storage", "args": [{"prim": "pair", "args": [
                {"prim": "big_map", "annots": ["%accounts"], "args": [{"prim": "address"}, {"prim": "nat"}]},
                {"prim": "nat", "annots": ["%totalSupply"]}
            ]}]},
            {"prim": "code", "args": [[{"prim": "FAILWITH"}]]}
        ],
        "storage": {"prim": "Pair", "args": [{"int": "17"}, {"int": "2000"}]}
    })
}

fn token_transport() -> MockTransport {
    let transport = MockTransport::new();
    transport.set_response(&contract_path(KT1, "script"), token_script());
    transport.set_response(&contract_path(KT1, "storage"), token_script()["storage"].clone());
    transport.set_response(&contract_path(KT1, "entrypoints"), json!({"entrypoints": {}}));
    transport
}

// ==================== Client Creation Tests ====================

#[tokio::test]
async fn test_client_new_mock() {
    let client = TezosClient::new_mock();
    let chain_id = client.chain_id().await.unwrap();
    assert_eq!(chain_id.to_b58(), MockTransport::CHAIN_ID);
}

#[tokio::test]
async fn test_client_with_custom_chain_id() {
    let transport = MockTransport::new();
    transport.set_response("/chains/main/chain_id", json!("NetXdQprcVkpaWU"));
    let client = TezosClient::with_transport(transport);

    let chain_id = client.chain_id().await.unwrap();
    assert_eq!(chain_id.to_b58(), "NetXdQprcVkpaWU");
}

#[tokio::test]
async fn test_malformed_response_is_serialization_error() {
    let transport = MockTransport::new();
    transport.set_response("/chains/main/chain_id", json!(42));
    let client = TezosClient::with_transport(transport);

    assert!(matches!(client.chain_id().await, Err(SdkError::Serialization(_))));
}

#[tokio::test]
async fn test_constants_default() {
    let client = TezosClient::new_mock();
    let constants = client.constants().await.unwrap();
    assert_eq!(constants.hard_gas_limit_per_operation, 1_040_000);
    assert_eq!(constants.hard_storage_limit_per_operation, 60_000);
}

// ==================== Contract Tests ====================

#[tokio::test]
async fn test_contract_at_derives_entrypoints() {
    let client = TezosClient::with_transport(token_transport());
    let contract = Contract::at(&client, KT1.parse().unwrap()).await.unwrap();

    assert_eq!(contract.methods(), vec!["mint", "transfer"]);

    let from: Address = FUNDRAISER_PKH.parse().unwrap();
    let call = contract
        .call("transfer", &[Token::from(from), Token::from(from), Token::from(5u64)])
        .unwrap();
    assert_eq!(call.entrypoint, "transfer");
    assert_eq!(
        call.value.to_json(),
        json!({"prim": "Pair", "args": [
            {"string": FUNDRAISER_PKH},
            {"prim": "Pair", "args": [{"string": FUNDRAISER_PKH}, {"int": "5"}]}
        ]})
    );
}

#[tokio::test]
async fn test_contract_storage_and_big_map() {
    let transport = token_transport();
    // expr hash of the packed address tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb
    transport.set_response(
        &format!("{}/context/big_maps/17/exprtr3iA2ZhFDtnJZDS1nVxJYeXGWw2AWziVAD7DZf7kxsHmNLZBB", HEAD),
        json!({"int": "1500"}),
    );
    let client = TezosClient::with_transport(transport);
    let contract = Contract::at(&client, KT1.parse().unwrap()).await.unwrap();

    let storage = contract.storage(&client).await.unwrap();
    let id = storage.field("accounts").and_then(Token::as_big_map).unwrap();
    assert_eq!(id, 17);
    assert_eq!(storage.field("totalSupply"), Some(&Token::from(2000u64)));

    let accounts = contract.storage_field_type("accounts").unwrap();
    let (key_ty, value_ty) = (&accounts.args()[0], &accounts.args()[1]);

    let holder: Address = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb".parse().unwrap();
    let balance = contract
        .big_map_get(&client, id, &Token::from(holder), key_ty, value_ty)
        .await
        .unwrap();
    assert_eq!(balance, Some(Token::from(1500u64)));

    let stranger: Address = FUNDRAISER_PKH.parse().unwrap();
    let missing = contract
        .big_map_get(&client, id, &Token::from(stranger), key_ty, value_ty)
        .await
        .unwrap();
    assert_eq!(missing, None);
}

// ==================== Submission Tests ====================

fn submission_transport(simulation_status: &str) -> MockTransport {
    let transport = token_transport();
    transport.set_response(&contract_path(FUNDRAISER_PKH, "counter"), json!("41"));
    transport.set_response(
        &contract_path(FUNDRAISER_PKH, "manager_key"),
        json!("edpkuafEa2wxjuAUcTmTuRMPyZwUavQaFi2AHfX7pPKuXej7hmujdE"),
    );
    transport.set_method_response(
        HttpMethod::Post,
        &format!("{}/helpers/scripts/run_operation", HEAD),
        json!({"contents": [{"kind": "transaction", "metadata": {"operation_result": {
            "status": simulation_status,
            "consumed_gas": "25000",
            "paid_storage_size_diff": "67",
            "errors": [{"id": "proto.005-PsBabyM1.michelson_v1.script_rejected"}]
        }}}]}),
    );
    transport.set_method_response(
        HttpMethod::Post,
        &format!("{}/helpers/forge/operations", HEAD),
        json!("a1b2c3d4"),
    );
    transport.set_method_response(
        HttpMethod::Post,
        "/injection/operation?chain=main",
        json!("oowvyjsidVJKWALAhX3ngWHsutf8b8iNSGvp8ht44Jgn26JbHcX"),
    );
    transport
}

#[tokio::test]
async fn test_submit_injects_signed_operation() {
    let client = TezosClient::with_transport(submission_transport("applied"));
    let contract = Contract::at(&client, KT1.parse().unwrap()).await.unwrap();
    let wallet = fundraiser_wallet();

    let call = contract.call("mint", &[Token::from(10u64)]).unwrap();
    let pending = client.submit(&wallet, call).await.unwrap();

    // a1b2c3d4 signed by the fundraiser key hashes to this operation hash
    assert_eq!(pending.hash().to_b58(), "oowvyjsidVJKWALAhX3ngWHsutf8b8iNSGvp8ht44Jgn26JbHcX");
    assert_eq!(pending.injected_at, MockTransport::HEAD_LEVEL);
}

#[tokio::test]
async fn test_submit_rejected_in_simulation() {
    let client = TezosClient::with_transport(submission_transport("failed"));
    let contract = Contract::at(&client, KT1.parse().unwrap()).await.unwrap();
    let wallet = fundraiser_wallet();

    let call = contract.call("mint", &[Token::from(10u64)]).unwrap();
    match client.submit(&wallet, call).await {
        Err(SdkError::Rejected { hash: None, errors }) => {
            assert_eq!(errors, vec!["proto.005-PsBabyM1.michelson_v1.script_rejected".to_string()]);
        }
        other => panic!("expected a simulation rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_unknown_account() {
    let client = TezosClient::with_transport(token_transport());
    let contract = Contract::at(&client, KT1.parse().unwrap()).await.unwrap();

    let call = contract.call("mint", &[Token::from(10u64)]).unwrap();
    let result = client.submit(&Wallet::new_random(), call).await;
    assert!(matches!(result, Err(SdkError::NotFound(_))));
}
