//! Integration tests for the Etherscan HTTP client against a mock server.
//!
//! Run with: `cargo test --test test_etherscan_client`

use std::time::Duration;

use etherscan_mcp::{AppError, ChainRequest, Config, EtherscanClient, ExplorerApi};
use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

async fn client_for(server: &MockServer) -> EtherscanClient {
    let mut config = Config::new("test-key").unwrap();
    config.api_url = format!("{}/v2/api", server.uri());
    config.timeout = Duration::from_secs(5);
    EtherscanClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_sends_chain_module_action_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/api"))
        .and(query_param("chainid", "137"))
        .and(query_param("module", "account"))
        .and(query_param("action", "tokenbalance"))
        .and(query_param("contractaddress", "0xabc"))
        .and(query_param("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": "135499"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let request =
        ChainRequest::new(137, "account", "tokenbalance").param("contractaddress", "0xabc");

    assert_eq!(client.call(request).await.unwrap(), json!("135499"));
}

#[tokio::test]
async fn test_status_zero_is_upstream_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Invalid API Key"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.call(ChainRequest::new(1, "contract", "getabi")).await.unwrap_err();

    match err {
        AppError::UpstreamRejected(msg) => assert!(msg.contains("Invalid API Key")),
        other => panic!("Expected UpstreamRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_records_is_empty_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "No records found",
            "result": []
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client.call(ChainRequest::new(1, "logs", "getLogs")).await.unwrap();

    assert_eq!(result, json!([]));
}

#[tokio::test]
async fn test_json_rpc_result_and_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "eth_call"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x01"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("action", "eth_getBlockByNumber"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "invalid argument 0: hex string without 0x prefix"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let ok = client.call(ChainRequest::new(1, "proxy", "eth_call")).await.unwrap();
    assert_eq!(ok, json!("0x01"));

    let err = client.call(ChainRequest::new(1, "proxy", "eth_getBlockByNumber")).await.unwrap_err();
    assert!(matches!(err, AppError::UpstreamRejected(msg) if msg.contains("invalid argument")));
}

#[tokio::test]
async fn test_http_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.call(ChainRequest::new(1, "stats", "tokensupply")).await.unwrap_err();

    assert!(matches!(err, AppError::Transport(_)));
}

#[tokio::test]
async fn test_unparsable_body_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.call(ChainRequest::new(1, "stats", "tokensupply")).await.unwrap_err();

    assert!(matches!(err, AppError::Transport(_)));
}

#[tokio::test]
async fn test_timeout_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "1", "message": "OK", "result": "1"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = Config::new("test-key").unwrap();
    config.api_url = format!("{}/v2/api", server.uri());
    config.timeout = Duration::from_millis(200);
    let client = EtherscanClient::new(&config).unwrap();

    let err = client.call(ChainRequest::new(1, "stats", "tokensupply")).await.unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));
}
