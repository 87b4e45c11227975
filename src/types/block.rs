//! Block-related types.

use serde::{Deserialize, Serialize};

/// Block timestamp response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockTimestamp {
    /// Network display name.
    pub network: String,
    /// Resolved block number.
    pub block_number: u64,
    /// UNIX timestamp in seconds.
    pub timestamp: u64,
    /// RFC 3339 rendering of the timestamp (UTC).
    pub datetime: String,
}
