//! Response envelope parsing.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};

/// Messages Etherscan pairs with status "0" when a list query simply matched nothing.
const EMPTY_RESULT_MESSAGES: [&str; 2] = ["No records found", "No transactions found"];

/// Error object returned by the `proxy` module in JSON-RPC form.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

/// Etherscan response body.
///
/// Most modules answer `{status, message, result}`; the `proxy` module answers
/// `{jsonrpc, id, result}` or `{jsonrpc, id, error}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl ApiEnvelope {
    /// Extract the `result` field, or the upstream failure.
    pub fn into_result(self) -> Result<Value> {
        if let Some(err) = self.error {
            let message = if err.message.is_empty() {
                format!("JSON-RPC error {}", err.code.unwrap_or_default())
            } else {
                err.message
            };
            return Err(AppError::UpstreamRejected(message));
        }

        match self.status.as_deref() {
            Some("1") | None => Ok(self.result),
            Some(_) => {
                let message = self.message.unwrap_or_else(|| "Unknown error".to_string());

                if self.result.is_array()
                    && EMPTY_RESULT_MESSAGES.iter().any(|m| message.starts_with(m))
                {
                    return Ok(self.result);
                }

                match self.result.as_str() {
                    Some(detail) if !detail.is_empty() => {
                        Err(AppError::UpstreamRejected(format!("{}: {}", message, detail)))
                    }
                    _ => Err(AppError::UpstreamRejected(message)),
                }
            }
        }
    }
}
