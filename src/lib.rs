//! Etherscan MCP Server Library
//!
//! A Model Context Protocol server exposing Etherscan v2 multichain queries as tools.
//!
//! # Features
//!
//! - **Tokens**: ERC20 balances and token metadata
//! - **Contracts**: ABIs, verified source code, creation info and read-only method calls
//! - **Transactions**: single and batched receipt lookups
//! - **Logs and Blocks**: event log search and block timestamps
//!
//! # Example
//!
//! ```rust,ignore
//! use etherscan_mcp::{Config, EtherscanMcpServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let server = EtherscanMcpServer::new(config)?;
//!     // Run server...
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ethereum;
pub mod etherscan;
pub mod mcp;
pub mod services;
pub mod types;

pub use config::Config;
pub use error::{AppError, ErrorBody, ErrorKind, Result};
pub use etherscan::{ChainRequest, EtherscanClient, ExplorerApi};
pub use mcp::{Dispatcher, EtherscanMcpServer, ToolName, ToolResult};
