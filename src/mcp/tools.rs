//! Tool table, typed tool inputs and argument validation.

use std::str::FromStr;

use alloy::primitives::{Address, B256};
use rmcp::schemars;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::error::{AppError, Result};

// ============================================================================
// Tool Table
// ============================================================================

/// Names of the exposed tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetTokenBalance,
    GetTokenDetails,
    GetContractAbi,
    GetContractSourceCode,
    ExecuteContractMethod,
    GetContractCreation,
    EthGetTransactionReceipt,
    EthGetTransactionReceipts,
    GetEventLogs,
    GetTimestampByBlockNumber,
}

impl ToolName {
    /// Every tool, in registration order.
    pub const ALL: [ToolName; 10] = [
        ToolName::GetTokenBalance,
        ToolName::GetTokenDetails,
        ToolName::GetContractAbi,
        ToolName::GetContractSourceCode,
        ToolName::ExecuteContractMethod,
        ToolName::GetContractCreation,
        ToolName::EthGetTransactionReceipt,
        ToolName::EthGetTransactionReceipts,
        ToolName::GetEventLogs,
        ToolName::GetTimestampByBlockNumber,
    ];

    /// Wire name of the tool.
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::GetTokenBalance => "getTokenBalance",
            ToolName::GetTokenDetails => "getTokenDetails",
            ToolName::GetContractAbi => "getContractABI",
            ToolName::GetContractSourceCode => "getContractSourceCode",
            ToolName::ExecuteContractMethod => "executeContractMethod",
            ToolName::GetContractCreation => "getContractCreation",
            ToolName::EthGetTransactionReceipt => "ethGetTransactionReceipt",
            ToolName::EthGetTransactionReceipts => "ethGetTransactionReceipts",
            ToolName::GetEventLogs => "getEventLogs",
            ToolName::GetTimestampByBlockNumber => "getTimestampByBlockNumber",
        }
    }

    /// Description advertised for the tool.
    pub fn description(self) -> &'static str {
        match self {
            ToolName::GetTokenBalance => {
                "Get the ERC20 token balance of an address, as a raw integer in the token's smallest unit"
            }
            ToolName::GetTokenDetails => {
                "Get ERC20 token name, symbol, decimals and total supply"
            }
            ToolName::GetContractAbi => {
                "Get the ABI of a verified contract with function and event summaries"
            }
            ToolName::GetContractSourceCode => {
                "Get the verified source code and compiler metadata of a contract"
            }
            ToolName::ExecuteContractMethod => {
                "Execute a read-only contract method via eth_call. Accepts a method signature (e.g. \"balanceOf(address) returns (uint256)\") or a JSON ABI fragment, and comma-separated arguments"
            }
            ToolName::GetContractCreation => {
                "Get the creator address and creation transaction of up to 5 contracts"
            }
            ToolName::EthGetTransactionReceipt => {
                "Get the normalized receipt of a transaction"
            }
            ToolName::EthGetTransactionReceipts => {
                "Get receipts for up to 20 transactions in one call, in request order"
            }
            ToolName::GetEventLogs => {
                "Get event logs by address and/or topics within a block range, most recent first (default 100, max 1000 entries)"
            }
            ToolName::GetTimestampByBlockNumber => {
                "Get the UNIX timestamp of a block by number or tag"
            }
        }
    }

    /// Static input schema of the tool.
    pub fn schema(self) -> ToolSchema {
        let input_fields: &'static [InputField] = match self {
            ToolName::GetTokenBalance => &[CHAIN_ID, CONTRACT_ADDRESS, HOLDER_ADDRESS],
            ToolName::GetTokenDetails
            | ToolName::GetContractAbi
            | ToolName::GetContractSourceCode => &[CHAIN_ID, CONTRACT_ADDRESS],
            ToolName::ExecuteContractMethod => {
                &[CHAIN_ID, CONTRACT_ADDRESS, METHOD_ABI, METHOD_PARAMS, BLOCK_TAG]
            }
            ToolName::GetContractCreation => &[CHAIN_ID, CONTRACT_ADDRESSES],
            ToolName::EthGetTransactionReceipt => &[CHAIN_ID, TX_HASH],
            ToolName::EthGetTransactionReceipts => &[CHAIN_ID, TX_HASHES],
            ToolName::GetEventLogs => &[
                CHAIN_ID,
                LOG_ADDRESS,
                FROM_BLOCK,
                TO_BLOCK,
                TOPICS,
                TOPIC_OPERATOR,
                LIMIT,
            ],
            ToolName::GetTimestampByBlockNumber => &[CHAIN_ID, BLOCK_NUMBER],
        };

        ToolSchema { name: self.as_str(), description: self.description(), input_fields }
    }
}

impl FromStr for ToolName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| AppError::UnknownTool(s.to_string()))
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument type of an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    String,
    /// JSON array of strings, or a comma-separated string.
    StringList,
}

/// One input field of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputField {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub description: &'static str,
}

/// Static description of a tool's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub input_fields: &'static [InputField],
}

impl ToolSchema {
    /// Report the first required field missing from `arguments`.
    pub fn check_required(&self, arguments: &serde_json::Map<String, Value>) -> Result<()> {
        match self
            .input_fields
            .iter()
            .find(|f| f.required && arguments.get(f.name).is_none_or(Value::is_null))
        {
            Some(field) => Err(AppError::SchemaValidation(format!(
                "{}: missing required field '{}'",
                self.name, field.name
            ))),
            None => Ok(()),
        }
    }
}

const CHAIN_ID: InputField = InputField {
    name: "chainID",
    field_type: FieldType::Integer,
    required: true,
    description: "Chain id (e.g. 1 for Ethereum, 56 for BSC, 137 for Polygon)",
};
const CONTRACT_ADDRESS: InputField = InputField {
    name: "contractAddress",
    field_type: FieldType::String,
    required: true,
    description: "Contract address (0x...)",
};
const HOLDER_ADDRESS: InputField = InputField {
    name: "address",
    field_type: FieldType::String,
    required: true,
    description: "Account address to check (0x...)",
};
const METHOD_ABI: InputField = InputField {
    name: "methodABI",
    field_type: FieldType::String,
    required: true,
    description: "Method signature or JSON ABI fragment",
};
const METHOD_PARAMS: InputField = InputField {
    name: "methodParams",
    field_type: FieldType::String,
    required: false,
    description: "Comma-separated method arguments",
};
const BLOCK_TAG: InputField = InputField {
    name: "tag",
    field_type: FieldType::String,
    required: false,
    description: "Block number or tag (default: latest)",
};
const CONTRACT_ADDRESSES: InputField = InputField {
    name: "contractAddresses",
    field_type: FieldType::StringList,
    required: true,
    description: "Up to 5 contract addresses",
};
const TX_HASH: InputField = InputField {
    name: "txHash",
    field_type: FieldType::String,
    required: true,
    description: "Transaction hash (0x...)",
};
const TX_HASHES: InputField = InputField {
    name: "txHashes",
    field_type: FieldType::StringList,
    required: true,
    description: "Up to 20 transaction hashes",
};
const LOG_ADDRESS: InputField = InputField {
    name: "address",
    field_type: FieldType::String,
    required: false,
    description: "Emitting contract address",
};
const FROM_BLOCK: InputField = InputField {
    name: "fromBlock",
    field_type: FieldType::String,
    required: false,
    description: "First block (default: 0)",
};
const TO_BLOCK: InputField = InputField {
    name: "toBlock",
    field_type: FieldType::String,
    required: false,
    description: "Last block (default: latest)",
};
const TOPICS: InputField = InputField {
    name: "topics",
    field_type: FieldType::StringList,
    required: false,
    description: "Up to 4 topics by position; empty or null entries match anything",
};
const TOPIC_OPERATOR: InputField = InputField {
    name: "topicOperator",
    field_type: FieldType::String,
    required: false,
    description: "'and' (default) or 'or' between topics",
};
const LIMIT: InputField = InputField {
    name: "limit",
    field_type: FieldType::Integer,
    required: false,
    description: "Maximum entries returned (default 100, max 1000)",
};
const BLOCK_NUMBER: InputField = InputField {
    name: "blockNumber",
    field_type: FieldType::String,
    required: true,
    description: "Block number (decimal or hex) or tag",
};

// ============================================================================
// Tool Inputs
// ============================================================================

/// A list argument given either as a JSON array or as a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum StringList {
    /// JSON array of strings; `null` entries are blank positions.
    Items(Vec<Option<String>>),
    /// Comma-separated string.
    Joined(String),
}

impl StringList {
    /// Trimmed entries. Comma-separated input drops empty segments.
    pub fn items(&self) -> Vec<String> {
        match self {
            StringList::Items(items) => items.iter().map(item_text).collect(),
            StringList::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Trimmed entries with empty positions kept, for positional lists.
    pub fn positions(&self) -> Vec<String> {
        match self {
            StringList::Items(items) => items.iter().map(item_text).collect(),
            StringList::Joined(joined) if joined.trim().is_empty() => Vec::new(),
            StringList::Joined(joined) => {
                joined.split(',').map(|s| s.trim().to_string()).collect()
            }
        }
    }
}

fn item_text(item: &Option<String>) -> String {
    item.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Input parameters for the getTokenBalance tool.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GetTokenBalanceInput {
    /// Chain id (e.g. 1 for Ethereum, 56 for BSC, 137 for Polygon).
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    /// Token contract address (0x...).
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
    /// Account address to check (0x...).
    pub address: String,
}

/// Input parameters for tools that take a single contract address.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ContractInput {
    /// Chain id (e.g. 1 for Ethereum, 56 for BSC, 137 for Polygon).
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    /// Contract address (0x...).
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
}

/// Input parameters for the executeContractMethod tool.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ExecuteContractMethodInput {
    /// Chain id (e.g. 1 for Ethereum, 56 for BSC, 137 for Polygon).
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    /// Contract address (0x...).
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
    /// Method signature (e.g. "balanceOf(address) returns (uint256)") or a JSON ABI function fragment.
    #[serde(rename = "methodABI")]
    pub method_abi: String,
    /// Comma-separated method arguments (e.g. "0xabc...,100").
    #[serde(rename = "methodParams", default)]
    pub method_params: Option<String>,
    /// Block number or tag to execute against. Defaults to "latest".
    #[serde(default)]
    pub tag: Option<String>,
}

/// Input parameters for the getContractCreation tool.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GetContractCreationInput {
    /// Chain id (e.g. 1 for Ethereum, 56 for BSC, 137 for Polygon).
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    /// Up to 5 contract addresses, as an array or a comma-separated string.
    #[serde(rename = "contractAddresses")]
    pub contract_addresses: StringList,
}

/// Input parameters for the ethGetTransactionReceipt tool.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GetTransactionReceiptInput {
    /// Chain id (e.g. 1 for Ethereum, 56 for BSC, 137 for Polygon).
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    /// Transaction hash (0x + 64 hex chars).
    #[serde(rename = "txHash")]
    pub tx_hash: String,
}

/// Input parameters for the ethGetTransactionReceipts tool.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GetTransactionReceiptsInput {
    /// Chain id (e.g. 1 for Ethereum, 56 for BSC, 137 for Polygon).
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    /// Up to 20 transaction hashes, as an array or a comma-separated string.
    #[serde(rename = "txHashes")]
    pub tx_hashes: StringList,
}

/// Input parameters for the getEventLogs tool.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GetEventLogsInput {
    /// Chain id (e.g. 1 for Ethereum, 56 for BSC, 137 for Polygon).
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    /// Emitting contract address. Required unless a topic is given.
    #[serde(default)]
    pub address: Option<String>,
    /// First block to search (decimal number or "latest"). Defaults to 0.
    #[serde(rename = "fromBlock", default)]
    pub from_block: Option<String>,
    /// Last block to search (decimal number or "latest"). Defaults to "latest".
    #[serde(rename = "toBlock", default)]
    pub to_block: Option<String>,
    /// Up to 4 topics by position (topic0 first); empty or null entries match anything.
    #[serde(default)]
    pub topics: Option<StringList>,
    /// How adjacent topics combine: "and" (default) or "or".
    #[serde(rename = "topicOperator", default)]
    pub topic_operator: Option<String>,
    /// Maximum number of entries returned, most recent first (default 100, max 1000).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Input parameters for the getTimestampByBlockNumber tool.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GetTimestampInput {
    /// Chain id (e.g. 1 for Ethereum, 56 for BSC, 137 for Polygon).
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    /// Block number (decimal or 0x hex) or a tag such as "latest".
    #[serde(rename = "blockNumber")]
    pub block_number: String,
}

/// A tool invocation with its typed arguments.
#[derive(Debug, Clone)]
pub enum ToolCall {
    GetTokenBalance(GetTokenBalanceInput),
    GetTokenDetails(ContractInput),
    GetContractAbi(ContractInput),
    GetContractSourceCode(ContractInput),
    ExecuteContractMethod(ExecuteContractMethodInput),
    GetContractCreation(GetContractCreationInput),
    EthGetTransactionReceipt(GetTransactionReceiptInput),
    EthGetTransactionReceipts(GetTransactionReceiptsInput),
    GetEventLogs(GetEventLogsInput),
    GetTimestampByBlockNumber(GetTimestampInput),
}

impl ToolCall {
    /// Tool this call targets.
    pub fn name(&self) -> ToolName {
        match self {
            ToolCall::GetTokenBalance(_) => ToolName::GetTokenBalance,
            ToolCall::GetTokenDetails(_) => ToolName::GetTokenDetails,
            ToolCall::GetContractAbi(_) => ToolName::GetContractAbi,
            ToolCall::GetContractSourceCode(_) => ToolName::GetContractSourceCode,
            ToolCall::ExecuteContractMethod(_) => ToolName::ExecuteContractMethod,
            ToolCall::GetContractCreation(_) => ToolName::GetContractCreation,
            ToolCall::EthGetTransactionReceipt(_) => ToolName::EthGetTransactionReceipt,
            ToolCall::EthGetTransactionReceipts(_) => ToolName::EthGetTransactionReceipts,
            ToolCall::GetEventLogs(_) => ToolName::GetEventLogs,
            ToolCall::GetTimestampByBlockNumber(_) => ToolName::GetTimestampByBlockNumber,
        }
    }

    /// Build a typed call from raw JSON arguments.
    ///
    /// Missing required fields and type mismatches are reported as
    /// schema validation errors.
    pub fn parse(tool: ToolName, arguments: Value) -> Result<Self> {
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(AppError::SchemaValidation(format!(
                    "{}: arguments must be an object, got {}",
                    tool, other
                )))
            }
        };

        tool.schema().check_required(&arguments)?;
        let arguments = Value::Object(arguments);

        Ok(match tool {
            ToolName::GetTokenBalance => ToolCall::GetTokenBalance(from_args(tool, arguments)?),
            ToolName::GetTokenDetails => ToolCall::GetTokenDetails(from_args(tool, arguments)?),
            ToolName::GetContractAbi => ToolCall::GetContractAbi(from_args(tool, arguments)?),
            ToolName::GetContractSourceCode => {
                ToolCall::GetContractSourceCode(from_args(tool, arguments)?)
            }
            ToolName::ExecuteContractMethod => {
                ToolCall::ExecuteContractMethod(from_args(tool, arguments)?)
            }
            ToolName::GetContractCreation => {
                ToolCall::GetContractCreation(from_args(tool, arguments)?)
            }
            ToolName::EthGetTransactionReceipt => {
                ToolCall::EthGetTransactionReceipt(from_args(tool, arguments)?)
            }
            ToolName::EthGetTransactionReceipts => {
                ToolCall::EthGetTransactionReceipts(from_args(tool, arguments)?)
            }
            ToolName::GetEventLogs => ToolCall::GetEventLogs(from_args(tool, arguments)?),
            ToolName::GetTimestampByBlockNumber => {
                ToolCall::GetTimestampByBlockNumber(from_args(tool, arguments)?)
            }
        })
    }
}

fn from_args<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| AppError::SchemaValidation(format!("{}: {}", tool, e)))
}

// ============================================================================
// Argument Validation
// ============================================================================

/// Validate a chain id.
pub fn parse_chain_id(chain_id: u64) -> Result<u64> {
    if chain_id == 0 {
        return Err(AppError::SchemaValidation("chainID must be a positive integer".into()));
    }
    Ok(chain_id)
}

/// Parse and validate an Ethereum address from a string.
///
/// Validates:
/// - Address format (0x + 40 hex characters)
/// - Basic format checks
pub fn parse_address(s: &str) -> Result<Address> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(AppError::SchemaValidation("Address cannot be empty".into()));
    }

    if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
        return Err(AppError::SchemaValidation(format!("Address must start with '0x': {}", s)));
    }

    // 0x + 40 hex chars
    if trimmed.len() != 42 {
        return Err(AppError::SchemaValidation(format!(
            "Address must be 42 characters (0x + 40 hex chars), got {}: {}",
            trimmed.len(),
            s
        )));
    }

    trimmed.parse::<Address>().map_err(|e| {
        AppError::SchemaValidation(format!("Invalid address format '{}': {}", s, e))
    })
}

/// Parse and validate a 32-byte hash (transaction hash or topic).
pub fn parse_hash(s: &str) -> Result<B256> {
    let trimmed = s.trim();

    if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
        return Err(AppError::SchemaValidation(format!("Hash must start with '0x': {}", s)));
    }

    // 0x + 64 hex chars
    if trimmed.len() != 66 {
        return Err(AppError::SchemaValidation(format!(
            "Hash must be 66 characters (0x + 64 hex chars), got {}: {}",
            trimmed.len(),
            s
        )));
    }

    trimmed
        .parse::<B256>()
        .map_err(|e| AppError::SchemaValidation(format!("Invalid hash format '{}': {}", s, e)))
}

/// Parse a bounded list of addresses.
pub fn parse_address_list(list: &StringList, max: usize) -> Result<Vec<Address>> {
    let items = list.items();
    check_batch_size(items.len(), max, "contract addresses")?;
    items.iter().map(|s| parse_address(s)).collect()
}

/// Parse a bounded list of hashes.
pub fn parse_hash_list(list: &StringList, max: usize) -> Result<Vec<B256>> {
    let items = list.items();
    check_batch_size(items.len(), max, "transaction hashes")?;
    items.iter().map(|s| parse_hash(s)).collect()
}

fn check_batch_size(len: usize, max: usize, what: &str) -> Result<()> {
    if len == 0 {
        return Err(AppError::SchemaValidation(format!("No {} provided", what)));
    }
    if len > max {
        return Err(AppError::SchemaValidation(format!(
            "Maximum {} {} allowed, got {}",
            max, what, len
        )));
    }
    Ok(())
}
