//! Type definitions module.
//!
//! Contains the output records returned by the tools.

pub mod block;
pub mod contract;
pub mod token;
pub mod transaction;

pub use block::*;
pub use contract::*;
pub use token::*;
pub use transaction::*;
