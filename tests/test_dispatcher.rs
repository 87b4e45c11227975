//! Integration tests for tool dispatch against an in-memory explorer API.
//!
//! Run with: `cargo test --test test_dispatcher`

mod common;

use common::{dispatcher, expect_error, expect_success, test_address, test_hash, MockApi};
use etherscan_mcp::{AppError, ErrorKind};
use serde_json::json;

const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
const TRANSFER_TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

#[tokio::test]
async fn test_unknown_tool_makes_no_call() {
    let api = MockApi::unreachable();
    let result = dispatcher(&api).dispatch("getFoo", json!({"chainID": 1})).await;

    assert_eq!(expect_error(result), ErrorKind::UnknownTool);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_missing_required_field_makes_no_call() {
    let api = MockApi::unreachable();
    let result = dispatcher(&api).dispatch("getTokenBalance", json!({"chainID": 1})).await;

    assert_eq!(expect_error(result), ErrorKind::SchemaValidationError);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_token_balance_is_integer_string() {
    let api = MockApi::new(|_| Ok(json!("135499000000")));
    let result = dispatcher(&api)
        .dispatch(
            "getTokenBalance",
            json!({"chainID": 1, "contractAddress": USDC, "address": VITALIK}),
        )
        .await;

    let value = expect_success(result);
    let balance = value["balance"].as_str().unwrap();
    assert!(balance.parse::<u128>().is_ok());
    assert_eq!(value["network"], "Ethereum Mainnet");

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!((calls[0].module, calls[0].action), ("account", "tokenbalance"));
    assert_eq!(calls[0].get("tag"), Some("latest"));
    assert_eq!(calls[0].get("contractaddress"), Some(USDC));
}

#[tokio::test]
async fn test_token_balance_rejects_non_integer() {
    let api = MockApi::new(|_| Ok(json!("not a number")));
    let result = dispatcher(&api)
        .dispatch(
            "getTokenBalance",
            json!({"chainID": 1, "contractAddress": USDC, "address": VITALIK}),
        )
        .await;

    assert_eq!(expect_error(result), ErrorKind::DecodingError);
}

#[tokio::test]
async fn test_token_details_zero_address_rejected() {
    // "No records found" envelopes reach the services as an empty array
    let api = MockApi::new(|_| Ok(json!([])));
    let result = dispatcher(&api)
        .dispatch("getTokenDetails", json!({"chainID": 1, "contractAddress": test_address(0)}))
        .await;

    assert_eq!(expect_error(result), ErrorKind::UpstreamRejected);
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn test_token_details_supply_fallback() {
    let api = MockApi::new(|request| match (request.module, request.action) {
        ("token", "tokeninfo") => Ok(json!([{
            "contractAddress": USDC,
            "tokenName": "USD Coin",
            "symbol": "USDC",
            "divisor": "6",
            "tokenType": "ERC20",
            "totalSupply": ""
        }])),
        ("stats", "tokensupply") => Ok(json!("1500000")),
        other => panic!("unexpected call {:?}", other),
    });

    let value = expect_success(
        dispatcher(&api)
            .dispatch("getTokenDetails", json!({"chainID": 1, "contractAddress": USDC}))
            .await,
    );

    assert_eq!(value["symbol"], "USDC");
    assert_eq!(value["decimals"], 6);
    assert_eq!(value["total_supply"], "1500000");
    assert_eq!(value["total_supply_formatted"], "1.5");
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_token_details_skips_supply_call_when_present() {
    let api = MockApi::new(|_| {
        Ok(json!([{"tokenName": "Tether USD", "symbol": "USDT", "divisor": "6", "totalSupply": "42"}]))
    });

    let value = expect_success(
        dispatcher(&api)
            .dispatch("getTokenDetails", json!({"chainID": 1, "contractAddress": USDC}))
            .await,
    );

    assert_eq!(value["total_supply"], "42");
    assert_eq!(api.call_count(), 1);
}

/// ABI encoding of a single `string` return value of up to 32 bytes.
fn abi_string(s: &str) -> String {
    let hex: String = s.bytes().map(|b| format!("{:02x}", b)).collect();
    format!("0x{:064x}{:064x}{:0<64}", 32, s.len(), hex)
}

const PRO_ENDPOINT: &str =
    "NOTOK: Sorry, it looks like you are trying to access an API Pro endpoint";

#[tokio::test]
async fn test_token_details_reads_contract_when_tokeninfo_rejected() {
    let api = MockApi::new(|request| match (request.module, request.action) {
        ("token", "tokeninfo") => Err(AppError::UpstreamRejected(PRO_ENDPOINT.into())),
        ("proxy", "eth_call") => match request.get("data") {
            Some("0x06fdde03") => Ok(json!(abi_string("USD Coin"))),
            Some("0x95d89b41") => Ok(json!(abi_string("USDC"))),
            Some("0x313ce567") => Ok(json!(format!("0x{:064x}", 6))),
            Some("0x18160ddd") => Ok(json!(format!("0x{:064x}", 1_500_000))),
            other => panic!("unexpected call data {:?}", other),
        },
        other => panic!("unexpected call {:?}", other),
    });

    let value = expect_success(
        dispatcher(&api)
            .dispatch("getTokenDetails", json!({"chainID": 1, "contractAddress": USDC}))
            .await,
    );

    assert_eq!(value["name"], "USD Coin");
    assert_eq!(value["symbol"], "USDC");
    assert_eq!(value["decimals"], 6);
    assert_eq!(value["total_supply"], "1500000");
    assert_eq!(value["total_supply_formatted"], "1.5");

    let calls = api.calls();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[0].action, "tokeninfo");
    assert!(calls[1..].iter().all(|c| c.action == "eth_call" && c.get("tag") == Some("latest")));
}

#[tokio::test]
async fn test_token_details_contract_read_without_code_rejected() {
    let api = MockApi::new(|request| match request.action {
        "tokeninfo" => Err(AppError::UpstreamRejected(PRO_ENDPOINT.into())),
        _ => Ok(json!("0x")),
    });

    let result = dispatcher(&api)
        .dispatch("getTokenDetails", json!({"chainID": 1, "contractAddress": test_address(0)}))
        .await;

    assert_eq!(expect_error(result), ErrorKind::UpstreamRejected);
    assert_eq!(api.call_count(), 5);
}

#[tokio::test]
async fn test_contract_abi_is_idempotent() {
    let abi = r#"[{"type":"function","name":"decimals","inputs":[],"outputs":[{"name":"","type":"uint8"}],"stateMutability":"view"},{"type":"event","name":"Transfer","inputs":[{"name":"from","type":"address","indexed":true},{"name":"to","type":"address","indexed":true},{"name":"value","type":"uint256","indexed":false}],"anonymous":false}]"#;
    let api = MockApi::new(move |_| Ok(json!(abi)));
    let dispatcher = dispatcher(&api);
    let args = json!({"chainID": 1, "contractAddress": USDC});

    let first = expect_success(dispatcher.dispatch("getContractABI", args.clone()).await);
    let second = expect_success(dispatcher.dispatch("getContractABI", args).await);

    assert_eq!(first, second);
    assert_eq!(first["functions"][0]["selector"], "0x313ce567");
    assert_eq!(first["events"][0]["topic"], TRANSFER_TOPIC);
}

#[tokio::test]
async fn test_contract_abi_not_verified() {
    let api = MockApi::new(|_| {
        Err(AppError::UpstreamRejected("NOTOK: Contract source code not verified".into()))
    });
    let result = dispatcher(&api)
        .dispatch("getContractABI", json!({"chainID": 1, "contractAddress": test_address(7)}))
        .await;

    assert_eq!(expect_error(result), ErrorKind::NotVerified);
}

#[tokio::test]
async fn test_contract_source_code() {
    let api = MockApi::new(|_| {
        Ok(json!([{
            "SourceCode": "contract A {}",
            "ABI": "[]",
            "ContractName": "A",
            "CompilerVersion": "v0.8.24+commit.e11b9ed9",
            "OptimizationUsed": "1",
            "Runs": "200",
            "ConstructorArguments": "",
            "EVMVersion": "Default",
            "Library": "",
            "LicenseType": "MIT",
            "Proxy": "0",
            "Implementation": "",
            "SwarmSource": ""
        }]))
    });

    let value = expect_success(
        dispatcher(&api)
            .dispatch("getContractSourceCode", json!({"chainID": 1, "contractAddress": USDC}))
            .await,
    );

    assert_eq!(value["verified"], true);
    assert_eq!(value["source_code"], "contract A {}");
    assert_eq!(value["optimization_used"], true);
    assert_eq!(value["proxy"], false);
}

#[tokio::test]
async fn test_contract_creation_over_limit_makes_no_call() {
    let api = MockApi::unreachable();
    let addresses: Vec<String> = (1..=6).map(test_address).collect();
    let result = dispatcher(&api)
        .dispatch("getContractCreation", json!({"chainID": 1, "contractAddresses": addresses}))
        .await;

    assert_eq!(expect_error(result), ErrorKind::SchemaValidationError);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_contract_creation_comma_separated() {
    let api = MockApi::new(|request| {
        let addresses: Vec<&str> =
            request.get("contractaddresses").unwrap_or_default().split(',').collect();
        Ok(addresses
            .iter()
            .map(|a| json!({"contractAddress": a, "contractCreator": VITALIK, "txHash": test_hash(9)}))
            .collect())
    });

    let joined = format!("{}, {}", test_address(1), test_address(2));
    let value = expect_success(
        dispatcher(&api)
            .dispatch("getContractCreation", json!({"chainID": 1, "contractAddresses": joined}))
            .await,
    );

    assert_eq!(value["requested_addresses"].as_array().unwrap().len(), 2);
    assert_eq!(value["creations"].as_array().unwrap().len(), 2);
    assert_eq!(value["creations"][0]["contract_creator"], VITALIK);
}

#[tokio::test]
async fn test_execute_contract_method_round_trip() {
    let api = MockApi::new(|request| {
        assert_eq!((request.module, request.action), ("proxy", "eth_call"));
        assert_eq!(request.get("data"), Some("0x0902f1ac"));
        Ok(json!(format!("0x{:064x}{:064x}{:064x}", 1000u64, 2000u64, 1_700_000_000u64)))
    });

    let value = expect_success(
        dispatcher(&api)
            .dispatch(
                "executeContractMethod",
                json!({
                    "chainID": 1,
                    "contractAddress": test_address(3),
                    "methodABI": "function getReserves() returns (uint112, uint112, uint32)",
                    "tag": "19000000"
                }),
            )
            .await,
    );

    assert_eq!(value["decoded_result"]["output_0"], "1000");
    assert_eq!(value["decoded_result"]["output_1"], "2000");
    assert_eq!(value["decoded_result"]["output_2"], "1700000000");
    assert_eq!(value["block_tag"], "0x121eac0");
}

#[tokio::test]
async fn test_execute_contract_method_argument_mismatch() {
    let api = MockApi::unreachable();
    let result = dispatcher(&api)
        .dispatch(
            "executeContractMethod",
            json!({
                "chainID": 1,
                "contractAddress": USDC,
                "methodABI": "balanceOf(address) returns (uint256)",
                "methodParams": format!("{},{}", VITALIK, VITALIK)
            }),
        )
        .await;

    assert_eq!(expect_error(result), ErrorKind::EncodingError);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_execute_contract_method_empty_return() {
    let api = MockApi::new(|_| Ok(json!("0x")));
    let result = dispatcher(&api)
        .dispatch(
            "executeContractMethod",
            json!({
                "chainID": 1,
                "contractAddress": USDC,
                "methodABI": "decimals() returns (uint8)"
            }),
        )
        .await;

    assert_eq!(expect_error(result), ErrorKind::DecodingError);
}

fn receipt(hash: &str) -> serde_json::Value {
    json!({
        "transactionHash": hash,
        "status": "0x1",
        "blockNumber": "0x10",
        "from": VITALIK,
        "to": USDC,
        "contractAddress": null,
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "logs": []
    })
}

#[tokio::test]
async fn test_transaction_receipt() {
    let hash = test_hash(1);
    let api = MockApi::new(|request| Ok(receipt(request.get("txhash").unwrap_or_default())));

    let value = expect_success(
        dispatcher(&api)
            .dispatch("ethGetTransactionReceipt", json!({"chainID": 1, "txHash": hash}))
            .await,
    );

    assert_eq!(value["receipt"]["status"], "success");
    assert_eq!(value["receipt"]["gas_used"], "21000");
}

#[tokio::test]
async fn test_transaction_receipts_preserve_order_and_isolate_failures() {
    let failing = test_hash(2);
    let hashes: Vec<String> = (1..=4).map(test_hash).collect();

    let api = MockApi::new(move |request| {
        let hash = request.get("txhash").unwrap_or_default();
        if hash == failing {
            Ok(serde_json::Value::Null)
        } else {
            Ok(receipt(hash))
        }
    });

    let value = expect_success(
        dispatcher(&api)
            .dispatch("ethGetTransactionReceipts", json!({"chainID": 1, "txHashes": hashes}))
            .await,
    );

    let receipts = value["receipts"].as_array().unwrap();
    assert_eq!(receipts.len(), hashes.len());
    for (entry, hash) in receipts.iter().zip(&hashes) {
        assert_eq!(entry["tx_hash"], hash.as_str());
    }
    assert_eq!(receipts[1]["success"], false);
    assert_eq!(receipts[1]["error"]["error"], "UpstreamRejected");
    assert_eq!(value["total_requested"], 4);
    assert_eq!(value["successful_count"], 3);
    assert_eq!(api.call_count(), 4);
}

#[tokio::test]
async fn test_transaction_receipts_over_limit_makes_no_call() {
    let api = MockApi::unreachable();
    let hashes: Vec<String> = (1..=21).map(test_hash).collect();
    let result = dispatcher(&api)
        .dispatch("ethGetTransactionReceipts", json!({"chainID": 1, "txHashes": hashes}))
        .await;

    assert_eq!(expect_error(result), ErrorKind::SchemaValidationError);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_event_logs_most_recent_first_and_limited() {
    let log = |block: &str, index: &str| {
        json!({
            "address": USDC,
            "topics": [TRANSFER_TOPIC],
            "data": "0x",
            "blockNumber": block,
            "timeStamp": "0x6553f100",
            "logIndex": index,
            "transactionHash": test_hash(5)
        })
    };
    let api = MockApi::new(move |_| Ok(json!([log("0x1", "0x0"), log("0x3", "0x1"), log("0x2", "0x0")])));

    let value = expect_success(
        dispatcher(&api)
            .dispatch(
                "getEventLogs",
                json!({
                    "chainID": 137,
                    "address": USDC,
                    "topics": [TRANSFER_TOPIC],
                    "fromBlock": "1",
                    "limit": 2
                }),
            )
            .await,
    );

    assert_eq!(value["count"], 2);
    assert_eq!(value["logs"][0]["block_number"], 3);
    assert_eq!(value["logs"][1]["block_number"], 2);
    assert_eq!(value["network"], "Polygon Mainnet");

    let calls = api.calls();
    assert_eq!(calls[0].chain_id, 137);
    assert_eq!(calls[0].get("topic0"), Some(TRANSFER_TOPIC));
    assert_eq!(calls[0].get("fromBlock"), Some("1"));
    assert_eq!(calls[0].get("toBlock"), Some("latest"));
}

#[tokio::test]
async fn test_event_logs_follow_full_pages_to_newest() {
    let log = |block: u64| {
        json!({
            "address": USDC,
            "topics": [TRANSFER_TOPIC],
            "data": "0x",
            "blockNumber": format!("0x{:x}", block),
            "timeStamp": "0x6553f100",
            "logIndex": "0x0",
            "transactionHash": test_hash(5)
        })
    };
    // Oldest first, 1000 per page; the second page restarts at block 1000
    let api = MockApi::new(move |request| match request.get("fromBlock") {
        Some("1") => Ok((1..=1000).map(&log).collect()),
        Some("1000") => Ok((1000..=1005).map(&log).collect()),
        other => panic!("unexpected fromBlock {:?}", other),
    });

    let value = expect_success(
        dispatcher(&api)
            .dispatch(
                "getEventLogs",
                json!({"chainID": 1, "address": USDC, "fromBlock": "1", "limit": 3}),
            )
            .await,
    );

    let blocks: Vec<_> = value["logs"].as_array().unwrap().iter().map(|l| l["block_number"].clone()).collect();
    assert_eq!(blocks, vec![json!(1005), json!(1004), json!(1003)]);
    assert_eq!(api.call_count(), 2);

    let value = expect_success(
        dispatcher(&api)
            .dispatch(
                "getEventLogs",
                json!({"chainID": 1, "address": USDC, "fromBlock": "1", "limit": 1000}),
            )
            .await,
    );

    // Block 1000 appears once even though both pages returned it
    assert_eq!(value["count"], 1000);
    assert_eq!(value["logs"][5]["block_number"], 1000);
    assert_eq!(value["logs"][6]["block_number"], 999);
}

#[tokio::test]
async fn test_event_logs_null_topic_is_wildcard() {
    let api = MockApi::new(|_| Ok(json!([])));

    let value = expect_success(
        dispatcher(&api)
            .dispatch(
                "getEventLogs",
                json!({"chainID": 1, "topics": [null, TRANSFER_TOPIC]}),
            )
            .await,
    );

    assert_eq!(value["count"], 0);
    let calls = api.calls();
    assert_eq!(calls[0].get("topic0"), None);
    assert_eq!(calls[0].get("topic1"), Some(TRANSFER_TOPIC));
}

#[tokio::test]
async fn test_event_logs_without_address_or_topic_makes_no_call() {
    let api = MockApi::unreachable();
    let result = dispatcher(&api).dispatch("getEventLogs", json!({"chainID": 1})).await;

    assert_eq!(expect_error(result), ErrorKind::SchemaValidationError);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_timestamp_by_block_number() {
    let api = MockApi::new(|request| {
        assert_eq!(request.get("tag"), Some("0x121eac0"));
        assert_eq!(request.get("boolean"), Some("false"));
        Ok(json!({"number": "0x121eac0", "timestamp": "0x6553f100", "hash": test_hash(4)}))
    });

    let value = expect_success(
        dispatcher(&api)
            .dispatch("getTimestampByBlockNumber", json!({"chainID": 1, "blockNumber": "19000000"}))
            .await,
    );

    assert_eq!(value["block_number"], 19_000_000);
    assert_eq!(value["timestamp"], 1_700_000_000);
    assert_eq!(value["datetime"], "2023-11-14T22:13:20Z");
}

#[tokio::test]
async fn test_transport_error_surfaces_as_result() {
    let api = MockApi::new(|_| Err(AppError::Transport("connection refused".into())));
    let result = dispatcher(&api)
        .dispatch("getTimestampByBlockNumber", json!({"chainID": 1, "blockNumber": "latest"}))
        .await;

    assert_eq!(expect_error(result), ErrorKind::TransportError);
}
