//! Tool dispatch: argument validation, service invocation and result shaping.

use std::sync::Arc;

use alloy::eips::BlockNumberOrTag;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{AppError, ErrorBody, Result},
    ethereum::{parse_block_tag, ContractCallSpec},
    etherscan::ExplorerApi,
    services::{
        BlockService, ContractService, LogFilter, LogService, TokenService, TopicOperator,
        TransactionService, DEFAULT_LOG_LIMIT, MAX_CREATION_ADDRESSES, MAX_RECEIPT_BATCH,
    },
};

use super::tools::{
    parse_address, parse_address_list, parse_chain_id, parse_hash, parse_hash_list,
    GetEventLogsInput, ToolCall, ToolName,
};

/// Outcome of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    Success(Value),
    Failure(ErrorBody),
}

impl ToolResult {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Failure(_))
    }

    /// Error body of a failed invocation.
    pub fn error(&self) -> Option<&ErrorBody> {
        match self {
            ToolResult::Failure(body) => Some(body),
            ToolResult::Success(_) => None,
        }
    }

    /// Payload of a successful invocation.
    pub fn value(&self) -> Option<&Value> {
        match self {
            ToolResult::Success(value) => Some(value),
            ToolResult::Failure(_) => None,
        }
    }

    /// Pretty JSON text of the payload or error body.
    pub fn to_pretty_json(&self) -> String {
        let rendered = match self {
            ToolResult::Success(value) => serde_json::to_string_pretty(value),
            ToolResult::Failure(body) => serde_json::to_string_pretty(body),
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\":\"DecodingError\",\"message\":\"{}\"}}", e))
    }
}

impl From<Result<Value>> for ToolResult {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(value) => ToolResult::Success(value),
            Err(e) => ToolResult::Failure(ErrorBody::from(&e)),
        }
    }
}

/// Routes tool calls to the services.
#[derive(Clone)]
pub struct Dispatcher {
    token_service: TokenService,
    contract_service: ContractService,
    transaction_service: TransactionService,
    log_service: LogService,
    block_service: BlockService,
}

impl Dispatcher {
    /// Create a dispatcher whose services share one explorer API handle.
    pub fn new(api: Arc<dyn ExplorerApi>) -> Self {
        Self {
            token_service: TokenService::new(api.clone()),
            contract_service: ContractService::new(api.clone()),
            transaction_service: TransactionService::new(api.clone()),
            log_service: LogService::new(api.clone()),
            block_service: BlockService::new(api),
        }
    }

    /// Dispatch a call by tool name with raw JSON arguments.
    ///
    /// Unknown names and malformed arguments fail before any API call.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> ToolResult {
        let call = name.parse::<ToolName>().and_then(|tool| ToolCall::parse(tool, arguments));

        match call {
            Ok(call) => self.execute(call).await,
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool call rejected");
                ToolResult::Failure(ErrorBody::from(&e))
            }
        }
    }

    /// Execute a typed tool call.
    pub async fn execute(&self, call: ToolCall) -> ToolResult {
        let tool = call.name();
        tracing::info!(tool = %tool, arguments = ?call, "Tool called");

        let result = self.run(call).await;
        if let Err(e) = &result {
            tracing::warn!(tool = %tool, error = %e, "Tool call failed");
        }
        result.into()
    }

    async fn run(&self, call: ToolCall) -> Result<Value> {
        match call {
            ToolCall::GetTokenBalance(input) => {
                let chain_id = parse_chain_id(input.chain_id)?;
                let token = parse_address(&input.contract_address)?;
                let holder = parse_address(&input.address)?;
                to_json(self.token_service.get_token_balance(chain_id, token, holder).await?)
            }
            ToolCall::GetTokenDetails(input) => {
                let chain_id = parse_chain_id(input.chain_id)?;
                let token = parse_address(&input.contract_address)?;
                to_json(self.token_service.get_token_details(chain_id, token).await?)
            }
            ToolCall::GetContractAbi(input) => {
                let chain_id = parse_chain_id(input.chain_id)?;
                let contract = parse_address(&input.contract_address)?;
                to_json(self.contract_service.get_contract_abi(chain_id, contract).await?)
            }
            ToolCall::GetContractSourceCode(input) => {
                let chain_id = parse_chain_id(input.chain_id)?;
                let contract = parse_address(&input.contract_address)?;
                to_json(self.contract_service.get_contract_source_code(chain_id, contract).await?)
            }
            ToolCall::ExecuteContractMethod(input) => {
                let chain_id = parse_chain_id(input.chain_id)?;
                let contract = parse_address(&input.contract_address)?;
                let tag = input
                    .tag
                    .as_deref()
                    .map(parse_block_tag)
                    .transpose()?
                    .unwrap_or(BlockNumberOrTag::Latest);
                let spec = ContractCallSpec::parse(
                    contract,
                    &input.method_abi,
                    input.method_params.as_deref(),
                )?;
                to_json(self.contract_service.execute_contract_method(chain_id, &spec, tag).await?)
            }
            ToolCall::GetContractCreation(input) => {
                let chain_id = parse_chain_id(input.chain_id)?;
                let contracts =
                    parse_address_list(&input.contract_addresses, MAX_CREATION_ADDRESSES)?;
                to_json(self.contract_service.get_contract_creation(chain_id, &contracts).await?)
            }
            ToolCall::EthGetTransactionReceipt(input) => {
                let chain_id = parse_chain_id(input.chain_id)?;
                let tx_hash = parse_hash(&input.tx_hash)?;
                to_json(self.transaction_service.get_transaction_receipt(chain_id, tx_hash).await?)
            }
            ToolCall::EthGetTransactionReceipts(input) => {
                let chain_id = parse_chain_id(input.chain_id)?;
                let tx_hashes = parse_hash_list(&input.tx_hashes, MAX_RECEIPT_BATCH)?;
                to_json(
                    self.transaction_service.get_transaction_receipts(chain_id, &tx_hashes).await?,
                )
            }
            ToolCall::GetEventLogs(input) => {
                let chain_id = parse_chain_id(input.chain_id)?;
                let filter = log_filter(&input)?;
                to_json(self.log_service.get_event_logs(chain_id, &filter).await?)
            }
            ToolCall::GetTimestampByBlockNumber(input) => {
                let chain_id = parse_chain_id(input.chain_id)?;
                if input.block_number.trim().is_empty() {
                    return Err(AppError::SchemaValidation("blockNumber cannot be empty".into()));
                }
                let block = parse_block_tag(&input.block_number)?;
                to_json(self.block_service.get_block_timestamp(chain_id, block).await?)
            }
        }
    }
}

/// Build a log filter from tool input. Empty topic positions are wildcards.
fn log_filter(input: &GetEventLogsInput) -> Result<LogFilter> {
    let address = input
        .address
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(parse_address)
        .transpose()?;

    let from_block = input
        .from_block
        .as_deref()
        .map(parse_block_tag)
        .transpose()?
        .unwrap_or(BlockNumberOrTag::Number(0));
    let to_block = input
        .to_block
        .as_deref()
        .map(parse_block_tag)
        .transpose()?
        .unwrap_or(BlockNumberOrTag::Latest);

    let topics = input
        .topics
        .as_ref()
        .map(|topics| topics.positions())
        .unwrap_or_default()
        .iter()
        .map(|topic| match topic.as_str() {
            "" | "null" => Ok(None),
            hash => parse_hash(hash).map(Some),
        })
        .collect::<Result<Vec<_>>>()?;

    let operator = input
        .topic_operator
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<TopicOperator>)
        .transpose()?
        .unwrap_or_default();

    let filter = LogFilter {
        address,
        from_block,
        to_block,
        topics,
        operator,
        limit: input.limit.unwrap_or(DEFAULT_LOG_LIMIT),
    };
    filter.validate()?;
    Ok(filter)
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
