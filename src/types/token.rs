//! Token-related types.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Token balance response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Network display name.
    pub network: String,
    /// Token contract address.
    pub contract_address: String,
    /// Holder address.
    pub address: String,
    /// Raw balance in the token's smallest unit.
    pub balance: String,
}

/// Token details response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDetails {
    /// Network display name.
    pub network: String,
    /// Token contract address.
    pub contract_address: String,
    /// Token name (e.g. "USD Coin").
    pub name: String,
    /// Token symbol (e.g. "USDC").
    pub symbol: String,
    /// Number of decimals, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    /// Token standard reported by the explorer (e.g. "ERC20").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Raw total supply in the smallest unit.
    pub total_supply: String,
    /// Total supply scaled by decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_supply_formatted: Option<String>,
}

/// Entry of the `token/tokeninfo` result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenInfo {
    #[serde(default)]
    pub token_name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub divisor: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub total_supply: Option<String>,
}

/// Format a U256 value with decimals to a human-readable string.
pub fn format_units(value: U256, decimals: u8) -> String {
    if value == U256::ZERO {
        return "0".to_string();
    }

    let value_str = value.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return value_str;
    }

    let len = value_str.len();
    if len <= decimals {
        let zeros = decimals - len;
        let fraction = value_str.trim_end_matches('0');
        format!("0.{}{}", "0".repeat(zeros), fraction)
    } else {
        let (integer, fraction) = value_str.split_at(len - decimals);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            integer.to_string()
        } else {
            format!("{}.{}", integer, fraction)
        }
    }
}

/// Parse a non-negative decimal integer string as returned by Etherscan.
pub fn parse_decimal_u256(value: &str) -> Option<U256> {
    let value = value.trim();
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(value, 10).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_000_000_000_000_000_000u64), 18), "1");
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(5u64), 3), "0.005");
        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(U256::from(1234u64), 0), "1234");
    }

    #[test]
    fn test_parse_decimal_u256() {
        assert_eq!(parse_decimal_u256("135499"), Some(U256::from(135499u64)));
        assert_eq!(parse_decimal_u256(" 0 "), Some(U256::ZERO));
        assert_eq!(parse_decimal_u256("-1"), None);
        assert_eq!(parse_decimal_u256("0x10"), None);
        assert_eq!(parse_decimal_u256(""), None);
    }

    #[test]
    fn test_raw_token_info_deserialize() {
        let raw: RawTokenInfo = serde_json::from_value(serde_json::json!({
            "contractAddress": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "tokenName": "USD Coin",
            "symbol": "USDC",
            "divisor": "6",
            "tokenType": "ERC20",
            "totalSupply": "1000000"
        }))
        .unwrap();
        assert_eq!(raw.token_name.as_deref(), Some("USD Coin"));
        assert_eq!(raw.divisor.as_deref(), Some("6"));
        assert_eq!(raw.total_supply.as_deref(), Some("1000000"));
    }
}
