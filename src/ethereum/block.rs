//! Block tag and hex quantity helpers.

use std::str::FromStr;

use alloy::{eips::BlockNumberOrTag, primitives::U256};

use crate::error::{AppError, Result};

/// Parse a block reference.
///
/// Accepts named tags (`latest`, `earliest`, `pending`, `safe`, `finalized`),
/// decimal block numbers and `0x` hex block numbers. Empty input means `latest`.
pub fn parse_block_tag(input: &str) -> Result<BlockNumberOrTag> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(BlockNumberOrTag::Latest);
    }

    if input.chars().all(|c| c.is_ascii_digit()) {
        return input
            .parse::<u64>()
            .map(BlockNumberOrTag::Number)
            .map_err(|e| AppError::SchemaValidation(format!("Invalid block number '{}': {}", input, e)));
    }

    BlockNumberOrTag::from_str(&input.to_lowercase())
        .map_err(|e| AppError::SchemaValidation(format!("Invalid block tag '{}': {}", input, e)))
}

/// Render a block reference the way `proxy` actions expect it (hex quantity or tag name).
pub fn proxy_tag(tag: BlockNumberOrTag) -> String {
    tag.to_string()
}

/// Parse a hex quantity such as `0x1b4`. Etherscan renders zero as `0x`.
pub fn parse_quantity_u64(value: &str) -> Result<u64> {
    let digits = strip_hex_prefix(value)?;
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| AppError::Decoding(format!("Invalid hex quantity '{}': {}", value, e)))
}

/// Parse a 256-bit hex quantity.
pub fn parse_quantity_u256(value: &str) -> Result<U256> {
    let digits = strip_hex_prefix(value)?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| AppError::Decoding(format!("Invalid hex quantity '{}': {}", value, e)))
}

fn strip_hex_prefix(value: &str) -> Result<&str> {
    let value = value.trim();
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| AppError::Decoding(format!("Hex quantity must start with '0x': {}", value)))
}
