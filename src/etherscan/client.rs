//! Etherscan HTTP client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use super::envelope::ApiEnvelope;
use crate::{
    config::Config,
    error::{AppError, Result},
};

/// A single explorer API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRequest {
    /// Numeric chain id routed by the v2 API.
    pub chain_id: u64,
    /// API module (e.g. "account", "contract", "proxy").
    pub module: &'static str,
    /// API action within the module.
    pub action: &'static str,
    /// Action-specific parameters, already stringified.
    pub params: BTreeMap<String, String>,
}

impl ChainRequest {
    /// Create a request with no parameters.
    pub fn new(chain_id: u64, module: &'static str, action: &'static str) -> Self {
        Self { chain_id, module, action, params: BTreeMap::new() }
    }

    /// Add a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Look up a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Full query string pairs, excluding the API key.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("chainid".to_string(), self.chain_id.to_string()),
            ("module".to_string(), self.module.to_string()),
            ("action".to_string(), self.action.to_string()),
        ];
        pairs.extend(self.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

/// Abstraction over the block explorer API.
///
/// Allows swapping the HTTP client for an in-memory implementation in tests.
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Execute a request and return the envelope's `result` field.
    async fn call(&self, request: ChainRequest) -> Result<Value>;
}

/// Etherscan v2 API client.
#[derive(Clone)]
pub struct EtherscanClient {
    /// HTTP client with the configured timeout.
    http: reqwest::Client,
    /// Endpoint URL.
    api_url: String,
    /// API key appended to every request.
    api_key: String,
}

impl EtherscanClient {
    /// Create a new Etherscan client.
    ///
    /// Note: This does NOT make any network calls.
    pub fn new(config: &Config) -> Result<Self> {
        reqwest::Url::parse(&config.api_url)
            .map_err(|_| AppError::Config(format!("Invalid API URL: {}", config.api_url)))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(api_url = %config.api_url, "Etherscan client created");

        Ok(Self { http, api_url: config.api_url.clone(), api_key: config.api_key.clone() })
    }

    /// Endpoint URL this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl ExplorerApi for EtherscanClient {
    async fn call(&self, request: ChainRequest) -> Result<Value> {
        tracing::debug!(
            chain_id = request.chain_id,
            module = request.module,
            action = request.action,
            params = ?request.params,
            "Sending Etherscan request"
        );

        let mut query = request.query_pairs();
        query.push(("apikey".to_string(), self.api_key.clone()));

        let response = self
            .http
            .get(&self.api_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!("Etherscan API returned status: {}", status)));
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Invalid JSON response: {}", e)))?;

        envelope.into_result().inspect_err(|e| {
            tracing::debug!(
                chain_id = request.chain_id,
                action = request.action,
                error = %e,
                "Etherscan request rejected"
            );
        })
    }
}
