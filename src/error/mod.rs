//! Error types and handling module.
//!
//! Defines all application-specific error types and the error kinds reported
//! back to MCP clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or HTTP failure while talking to the explorer API.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The explorer API answered with a failure status.
    #[error("Upstream rejected request: {0}")]
    UpstreamRejected(String),

    /// Contract has no verified source or ABI.
    #[error("Contract not verified: {0}")]
    NotVerified(String),

    /// Method signature or arguments could not be ABI-encoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Return data could not be decoded into the declared types.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Tool name is not part of the tool table.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments failed validation.
    #[error("Invalid arguments: {0}")]
    SchemaValidation(String),
}

/// Error kind reported to MCP clients in `{error, message}` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ConfigurationError,
    TransportError,
    UpstreamRejected,
    NotVerified,
    EncodingError,
    DecodingError,
    UnknownTool,
    SchemaValidationError,
}

impl AppError {
    /// The client-facing kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(_) => ErrorKind::ConfigurationError,
            AppError::Transport(_) => ErrorKind::TransportError,
            AppError::UpstreamRejected(_) => ErrorKind::UpstreamRejected,
            AppError::NotVerified(_) => ErrorKind::NotVerified,
            AppError::Encoding(_) => ErrorKind::EncodingError,
            AppError::Decoding(_) => ErrorKind::DecodingError,
            AppError::UnknownTool(_) => ErrorKind::UnknownTool,
            AppError::SchemaValidation(_) => ErrorKind::SchemaValidationError,
        }
    }
}

/// Client-facing `{error, message}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self { error: err.kind(), message: err.to_string() }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<alloy::hex::FromHexError> for AppError {
    fn from(err: alloy::hex::FromHexError) -> Self {
        AppError::Decoding(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decoding(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
