//! Etherscan API access module.
//!
//! Contains the request/envelope types, the HTTP client and the network name table.

pub mod client;
pub mod envelope;
pub mod networks;

pub use client::{ChainRequest, EtherscanClient, ExplorerApi};
pub use envelope::ApiEnvelope;
pub use networks::network_name;
