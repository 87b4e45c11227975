//! Ethereum encoding module.
//!
//! Contains the ABI call glue and block/quantity helpers.

pub mod abi;
pub mod block;

pub use abi::ContractCallSpec;
pub use block::{parse_block_tag, parse_quantity_u256, parse_quantity_u64, proxy_tag};
