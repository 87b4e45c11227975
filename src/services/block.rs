//! Block query service.

use alloy::eips::BlockNumberOrTag;
use chrono::{DateTime, SecondsFormat};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    ethereum::{parse_quantity_u64, proxy_tag},
    etherscan::{network_name, ChainRequest, ExplorerApi},
    types::BlockTimestamp,
};

/// Block header fields we need from `eth_getBlockByNumber`.
#[derive(Debug, Deserialize)]
struct RawBlockHeader {
    number: String,
    timestamp: String,
}

/// Service for block lookups.
#[derive(Clone)]
pub struct BlockService {
    api: Arc<dyn ExplorerApi>,
}

impl BlockService {
    /// Create a new block service.
    pub fn new(api: Arc<dyn ExplorerApi>) -> Self {
        Self { api }
    }

    /// Get the UNIX timestamp of a block.
    pub async fn get_block_timestamp(
        &self,
        chain_id: u64,
        block: BlockNumberOrTag,
    ) -> Result<BlockTimestamp> {
        let tag = proxy_tag(block);
        tracing::debug!(chain_id, block = %tag, "Querying block timestamp");

        let request = ChainRequest::new(chain_id, "proxy", "eth_getBlockByNumber")
            .param("tag", tag.clone())
            .param("boolean", "false");
        let result = self.api.call(request).await?;

        if result.is_null() {
            return Err(AppError::UpstreamRejected(format!("Block {} not found", tag)));
        }

        let header: RawBlockHeader = serde_json::from_value(result)
            .map_err(|e| AppError::Decoding(format!("Unexpected block format: {}", e)))?;

        let block_number = parse_quantity_u64(&header.number)?;
        let timestamp = parse_quantity_u64(&header.timestamp)?;

        Ok(BlockTimestamp {
            network: network_name(chain_id),
            block_number,
            timestamp,
            datetime: format_timestamp(timestamp)?,
        })
    }
}

fn format_timestamp(timestamp: u64) -> Result<String> {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| AppError::Decoding(format!("Timestamp out of range: {}", timestamp)))
}
