//! Transaction receipt service.

use alloy::primitives::B256;
use futures::{stream, StreamExt};
use std::sync::Arc;

use crate::{
    error::{AppError, ErrorBody, Result},
    etherscan::{network_name, ChainRequest, ExplorerApi},
    types::{
        RawReceipt, ReceiptBatchEntry, TransactionReceiptBatch, TransactionReceiptInfo,
        TransactionReceiptResponse,
    },
};

/// Maximum number of hashes accepted by a receipt batch.
pub const MAX_RECEIPT_BATCH: usize = 20;

/// Receipt requests in flight at once within a batch.
pub const RECEIPT_CONCURRENCY: usize = 5;

/// Service for transaction receipts.
#[derive(Clone)]
pub struct TransactionService {
    api: Arc<dyn ExplorerApi>,
}

impl TransactionService {
    /// Create a new transaction service.
    pub fn new(api: Arc<dyn ExplorerApi>) -> Self {
        Self { api }
    }

    /// Get the normalized receipt of a single transaction.
    pub async fn get_transaction_receipt(
        &self,
        chain_id: u64,
        tx_hash: B256,
    ) -> Result<TransactionReceiptResponse> {
        let receipt = self.fetch_receipt(chain_id, tx_hash).await?;
        Ok(TransactionReceiptResponse { network: network_name(chain_id), receipt })
    }

    /// Get receipts for up to [`MAX_RECEIPT_BATCH`] transactions.
    ///
    /// Entries come back in request order. A failing hash yields an error entry
    /// and does not abort the rest of the batch.
    pub async fn get_transaction_receipts(
        &self,
        chain_id: u64,
        tx_hashes: &[B256],
    ) -> Result<TransactionReceiptBatch> {
        if tx_hashes.is_empty() || tx_hashes.len() > MAX_RECEIPT_BATCH {
            return Err(AppError::SchemaValidation(format!(
                "Between 1 and {} transaction hashes required, got {}",
                MAX_RECEIPT_BATCH,
                tx_hashes.len()
            )));
        }

        let receipts: Vec<ReceiptBatchEntry> = stream::iter(tx_hashes.iter().copied())
            .map(|tx_hash| async move {
                match self.fetch_receipt(chain_id, tx_hash).await {
                    Ok(receipt) => ReceiptBatchEntry {
                        tx_hash: tx_hash.to_string(),
                        success: true,
                        receipt: Some(receipt),
                        error: None,
                    },
                    Err(e) => {
                        tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed");
                        ReceiptBatchEntry {
                            tx_hash: tx_hash.to_string(),
                            success: false,
                            receipt: None,
                            error: Some(ErrorBody::from(&e)),
                        }
                    }
                }
            })
            .buffered(RECEIPT_CONCURRENCY)
            .collect()
            .await;

        let successful_count = receipts.iter().filter(|r| r.success).count();

        Ok(TransactionReceiptBatch {
            network: network_name(chain_id),
            total_requested: tx_hashes.len(),
            successful_count,
            receipts,
        })
    }

    async fn fetch_receipt(&self, chain_id: u64, tx_hash: B256) -> Result<TransactionReceiptInfo> {
        tracing::debug!(chain_id, tx_hash = %tx_hash, "Querying transaction receipt");

        let request = ChainRequest::new(chain_id, "proxy", "eth_getTransactionReceipt")
            .param("txhash", tx_hash.to_string());
        let result = self.api.call(request).await?;

        if result.is_null() {
            return Err(AppError::UpstreamRejected(format!(
                "No receipt found for {} (unknown or pending transaction)",
                tx_hash
            )));
        }

        let raw: RawReceipt = serde_json::from_value(result)
            .map_err(|e| AppError::Decoding(format!("Unexpected receipt format: {}", e)))?;
        TransactionReceiptInfo::from_raw(raw)
    }
}
