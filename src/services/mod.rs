//! Business logic services module.

pub mod block;
pub mod contract;
pub mod logs;
pub mod token;
pub mod transaction;

pub use block::BlockService;
pub use contract::{ContractService, MAX_CREATION_ADDRESSES};
pub use logs::{LogFilter, LogService, TopicOperator, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};
pub use token::TokenService;
pub use transaction::{TransactionService, MAX_RECEIPT_BATCH};
