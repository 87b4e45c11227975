//! Token query service.

use alloy::{eips::BlockNumberOrTag, primitives::Address};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    ethereum::ContractCallSpec,
    etherscan::{network_name, ChainRequest, ExplorerApi},
    services::ContractService,
    types::{format_units, parse_decimal_u256, RawTokenInfo, TokenBalance, TokenDetails},
};

const ERC20_NAME: &str = "name() returns (string)";
const ERC20_SYMBOL: &str = "symbol() returns (string)";
const ERC20_DECIMALS: &str = "decimals() returns (uint8)";
const ERC20_TOTAL_SUPPLY: &str = "totalSupply() returns (uint256)";

/// Service for token balances and metadata.
#[derive(Clone)]
pub struct TokenService {
    api: Arc<dyn ExplorerApi>,
    contracts: ContractService,
}

impl TokenService {
    /// Create a new token service.
    pub fn new(api: Arc<dyn ExplorerApi>) -> Self {
        Self { contracts: ContractService::new(api.clone()), api }
    }

    /// Get the raw token balance of `holder`.
    ///
    /// The balance is returned in the token's smallest unit; decimal scaling is
    /// left to the caller.
    pub async fn get_token_balance(
        &self,
        chain_id: u64,
        token: Address,
        holder: Address,
    ) -> Result<TokenBalance> {
        tracing::debug!(chain_id, token = %token, holder = %holder, "Querying token balance");

        let request = ChainRequest::new(chain_id, "account", "tokenbalance")
            .param("contractaddress", token.to_string())
            .param("address", holder.to_string())
            .param("tag", "latest");

        let result = self.api.call(request).await?;
        let balance = decimal_result(&result)
            .ok_or_else(|| AppError::Decoding(format!("Unexpected balance value: {}", result)))?;

        Ok(TokenBalance {
            network: network_name(chain_id),
            contract_address: token.to_string(),
            address: holder.to_string(),
            balance,
        })
    }

    /// Get token name, symbol, decimals and total supply.
    ///
    /// Issues `token/tokeninfo` and falls back to `stats/tokensupply` only when
    /// the metadata lacks a supply figure. `tokeninfo` is restricted to paid API
    /// plans; when the explorer rejects it, the metadata is read from the
    /// contract through ERC20 `eth_call`s instead.
    pub async fn get_token_details(&self, chain_id: u64, token: Address) -> Result<TokenDetails> {
        tracing::debug!(chain_id, token = %token, "Querying token details");

        let request = ChainRequest::new(chain_id, "token", "tokeninfo")
            .param("contractaddress", token.to_string());
        let result = match self.api.call(request).await {
            Ok(result) => result,
            Err(AppError::UpstreamRejected(reason)) => {
                tracing::info!(
                    chain_id,
                    token = %token,
                    reason = %reason,
                    "tokeninfo rejected, reading ERC20 metadata from the contract"
                );
                return self.token_details_from_contract(chain_id, token).await;
            }
            Err(e) => return Err(e),
        };

        let info = match result {
            Value::Array(entries) => entries.into_iter().next(),
            Value::Object(_) => Some(result),
            _ => None,
        }
        .ok_or_else(|| {
            AppError::UpstreamRejected(format!("No token metadata found for {}", token))
        })?;

        let info: RawTokenInfo = serde_json::from_value(info)
            .map_err(|e| AppError::Decoding(format!("Unexpected token metadata: {}", e)))?;

        let decimals = info.divisor.as_deref().and_then(|d| d.trim().parse::<u8>().ok());

        let total_supply = match info.total_supply.as_deref().and_then(parse_decimal_u256) {
            Some(supply) => supply,
            None => {
                let request = ChainRequest::new(chain_id, "stats", "tokensupply")
                    .param("contractaddress", token.to_string());
                let result = self.api.call(request).await?;
                decimal_result(&result)
                    .as_deref()
                    .and_then(parse_decimal_u256)
                    .ok_or_else(|| {
                        AppError::Decoding(format!("Unexpected total supply value: {}", result))
                    })?
            }
        };

        Ok(TokenDetails {
            network: network_name(chain_id),
            contract_address: token.to_string(),
            name: info.token_name.unwrap_or_else(|| "Unknown".to_string()),
            symbol: info.symbol.unwrap_or_else(|| "Unknown".to_string()),
            decimals,
            token_type: info.token_type.filter(|t| !t.is_empty()),
            total_supply: total_supply.to_string(),
            total_supply_formatted: decimals.map(|d| format_units(total_supply, d)),
        })
    }

    /// Read name, symbol, decimals and total supply with ERC20 view calls.
    ///
    /// `totalSupply` must answer; the other three are optional in ERC20 and
    /// fall back to "Unknown" / absent.
    async fn token_details_from_contract(
        &self,
        chain_id: u64,
        token: Address,
    ) -> Result<TokenDetails> {
        let (name, symbol, decimals, total_supply) = futures::join!(
            self.read_erc20(chain_id, token, ERC20_NAME),
            self.read_erc20(chain_id, token, ERC20_SYMBOL),
            self.read_erc20(chain_id, token, ERC20_DECIMALS),
            self.read_erc20(chain_id, token, ERC20_TOTAL_SUPPLY),
        );

        let total_supply = match total_supply {
            Ok(value) => decimal_result(&value).as_deref().and_then(parse_decimal_u256).ok_or_else(
                || AppError::Decoding(format!("Unexpected total supply value: {}", value)),
            )?,
            // Empty return data: no ERC20 contract at this address.
            Err(AppError::Decoding(_)) => {
                return Err(AppError::UpstreamRejected(format!(
                    "No token metadata found for {}",
                    token
                )))
            }
            Err(e) => return Err(e),
        };

        let text = |value: Result<Value>| match value {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => "Unknown".to_string(),
        };
        let decimals = decimals
            .ok()
            .and_then(|value| decimal_result(&value))
            .and_then(|d| d.parse::<u8>().ok());

        Ok(TokenDetails {
            network: network_name(chain_id),
            contract_address: token.to_string(),
            name: text(name),
            symbol: text(symbol),
            decimals,
            token_type: Some("ERC20".to_string()),
            total_supply: total_supply.to_string(),
            total_supply_formatted: decimals.map(|d| format_units(total_supply, d)),
        })
    }

    async fn read_erc20(&self, chain_id: u64, token: Address, method: &str) -> Result<Value> {
        let spec = ContractCallSpec::parse(token, method, None)?;
        let result =
            self.contracts.execute_contract_method(chain_id, &spec, BlockNumberOrTag::Latest).await?;
        Ok(result.decoded_result)
    }
}

/// Read a non-negative decimal integer result, normalized (no leading zeros).
fn decimal_result(result: &Value) -> Option<String> {
    match result {
        Value::String(s) => parse_decimal_u256(s).map(|n| n.to_string()),
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        _ => None,
    }
}
