//! MCP server module.
//!
//! Contains the tool table, the dispatcher and the rmcp server with tool handlers.

pub mod dispatcher;
pub mod server;
pub mod tools;

pub use dispatcher::{Dispatcher, ToolResult};
pub use server::{into_call_tool_result, EtherscanMcpServer};
pub use tools::{StringList, ToolCall, ToolName, ToolSchema};
