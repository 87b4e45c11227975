//! Common utilities for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use etherscan_mcp::{
    mcp::Dispatcher, ChainRequest, Config, ErrorKind, EtherscanMcpServer, ExplorerApi, Result,
    ToolResult,
};
use serde_json::Value;

type Handler = Box<dyn Fn(&ChainRequest) -> Result<Value> + Send + Sync>;

/// In-memory explorer API that answers from a handler and records every request.
pub struct MockApi {
    handler: Handler,
    calls: Mutex<Vec<ChainRequest>>,
}

impl MockApi {
    pub fn new(handler: impl Fn(&ChainRequest) -> Result<Value> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self { handler: Box::new(handler), calls: Mutex::new(Vec::new()) })
    }

    /// A mock that fails the test if any request reaches it.
    pub fn unreachable() -> Arc<Self> {
        Self::new(|request| {
            panic!("unexpected API call: {}/{}", request.module, request.action)
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<ChainRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExplorerApi for MockApi {
    async fn call(&self, request: ChainRequest) -> Result<Value> {
        self.calls.lock().unwrap().push(request.clone());
        (self.handler)(&request)
    }
}

/// Dispatcher backed by the given mock.
pub fn dispatcher(api: &Arc<MockApi>) -> Dispatcher {
    Dispatcher::new(api.clone())
}

/// Payload of a successful result, panicking with the error body otherwise.
pub fn expect_success(result: ToolResult) -> Value {
    match result {
        ToolResult::Success(value) => value,
        ToolResult::Failure(body) => panic!("Expected success, got {:?}: {}", body.error, body.message),
    }
}

/// Error kind of a failed result, panicking on success.
pub fn expect_error(result: ToolResult) -> ErrorKind {
    match result {
        ToolResult::Failure(body) => body.error,
        ToolResult::Success(value) => panic!("Expected failure, got {}", value),
    }
}

/// Lowercase test address derived from a byte.
pub fn test_address(byte: u8) -> String {
    format!("0x{}", hex_byte(byte).repeat(20))
}

/// 32-byte test hash derived from a byte.
pub fn test_hash(byte: u8) -> String {
    format!("0x{}", hex_byte(byte).repeat(32))
}

fn hex_byte(byte: u8) -> String {
    format!("{:02x}", byte)
}

/// Helper to create a live server from environment variables.
pub fn create_live_server() -> Option<EtherscanMcpServer> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let api_key = std::env::var("ETHERSCAN_API_KEY").ok()?;
    let config = Config::new(api_key).ok()?;

    EtherscanMcpServer::new(config).ok()
}

/// Skip test if the live server cannot be created (missing env vars).
#[macro_export]
macro_rules! skip_if_no_server {
    () => {
        match common::create_live_server() {
            Some(server) => server,
            None => {
                eprintln!("Skipping test: ETHERSCAN_API_KEY not set");
                return;
            }
        }
    };
}
