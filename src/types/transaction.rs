//! Transaction receipt and event log types.

use serde::{Deserialize, Serialize};

use crate::{
    error::{ErrorBody, Result},
    ethereum::{parse_quantity_u256, parse_quantity_u64},
};

/// Log entry as returned by receipts and `logs/getLogs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: Option<String>,
    pub time_stamp: Option<String>,
    pub log_index: Option<String>,
    pub transaction_hash: Option<String>,
}

/// Normalized log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Emitting contract.
    pub address: String,
    /// Indexed topics, topic0 first.
    pub topics: Vec<String>,
    /// Non-indexed data (hex).
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl LogEntry {
    /// Normalize a raw log, decoding its hex quantities.
    pub fn from_raw(raw: RawLog) -> Result<Self> {
        Ok(Self {
            address: raw.address,
            topics: raw.topics,
            data: raw.data,
            block_number: raw.block_number.as_deref().map(parse_quantity_u64).transpose()?,
            log_index: raw.log_index.as_deref().map(parse_quantity_u64).transpose()?,
            timestamp: raw.time_stamp.as_deref().map(parse_quantity_u64).transpose()?,
            transaction_hash: raw.transaction_hash,
        })
    }
}

/// Transaction receipt as returned by `proxy/eth_getTransactionReceipt`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawReceipt {
    pub transaction_hash: String,
    pub status: Option<String>,
    pub block_number: Option<String>,
    pub from: String,
    pub to: Option<String>,
    pub contract_address: Option<String>,
    pub gas_used: Option<String>,
    pub cumulative_gas_used: Option<String>,
    pub effective_gas_price: Option<String>,
    pub logs: Vec<RawLog>,
}

/// Execution status of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Status `0x1`.
    Success,
    /// Status `0x0`.
    Failed,
    /// Pre-Byzantium receipts carry no status.
    Unknown,
}

/// Normalized transaction receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceiptInfo {
    pub transaction_hash: String,
    pub status: ReceiptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    /// Gas used (decimal).
    pub gas_used: String,
    /// Cumulative gas used in the block up to this transaction (decimal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_gas_used: Option<String>,
    /// Effective gas price in wei (decimal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_gas_price: Option<String>,
    pub logs: Vec<LogEntry>,
}

impl TransactionReceiptInfo {
    /// Normalize a raw receipt.
    pub fn from_raw(raw: RawReceipt) -> Result<Self> {
        let status = match raw.status.as_deref().map(parse_quantity_u64).transpose()? {
            Some(1) => ReceiptStatus::Success,
            Some(_) => ReceiptStatus::Failed,
            None => ReceiptStatus::Unknown,
        };

        let decimal = |v: Option<String>| -> Result<Option<String>> {
            v.as_deref().map(|s| parse_quantity_u256(s).map(|n| n.to_string())).transpose()
        };

        Ok(Self {
            transaction_hash: raw.transaction_hash,
            status,
            block_number: raw.block_number.as_deref().map(parse_quantity_u64).transpose()?,
            from: raw.from,
            to: raw.to.filter(|s| !s.is_empty()),
            contract_address: raw.contract_address.filter(|s| !s.is_empty()),
            gas_used: decimal(raw.gas_used)?.unwrap_or_else(|| "0".to_string()),
            cumulative_gas_used: decimal(raw.cumulative_gas_used)?,
            effective_gas_price: decimal(raw.effective_gas_price)?,
            logs: raw.logs.into_iter().map(LogEntry::from_raw).collect::<Result<_>>()?,
        })
    }
}

/// Single receipt response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceiptResponse {
    /// Network display name.
    pub network: String,
    /// Normalized receipt.
    pub receipt: TransactionReceiptInfo,
}

/// One entry of a receipt batch, in request order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptBatchEntry {
    pub tx_hash: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<TransactionReceiptInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Batch receipt response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceiptBatch {
    /// Network display name.
    pub network: String,
    pub total_requested: usize,
    pub successful_count: usize,
    /// One entry per requested hash, in request order.
    pub receipts: Vec<ReceiptBatchEntry>,
}

/// Event log query response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogs {
    /// Network display name.
    pub network: String,
    /// Number of returned entries.
    pub count: usize,
    /// Matching logs, most recent first.
    pub logs: Vec<LogEntry>,
}
