//! MCP server implementation.

use std::sync::Arc;

use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};

use crate::{
    config::Config,
    error::AppError,
    etherscan::{EtherscanClient, ExplorerApi},
};

use super::{
    dispatcher::{Dispatcher, ToolResult},
    tools::{
        ContractInput, ExecuteContractMethodInput, GetContractCreationInput, GetEventLogsInput,
        GetTimestampInput, GetTokenBalanceInput, GetTransactionReceiptInput,
        GetTransactionReceiptsInput, ToolCall,
    },
};

/// Etherscan MCP Server.
///
/// Exposes token, contract, transaction, log and block queries against the
/// Etherscan v2 multichain API.
#[derive(Clone)]
pub struct EtherscanMcpServer {
    dispatcher: Dispatcher,
    tool_router: ToolRouter<Self>,
}

impl EtherscanMcpServer {
    /// Create a server backed by the Etherscan HTTP API.
    ///
    /// No network calls are made until the first tool is invoked.
    pub fn new(config: Config) -> Result<Self, AppError> {
        tracing::info!(api_url = %config.api_url, "Initializing Etherscan MCP Server");

        let client = EtherscanClient::new(&config)?;
        Ok(Self::with_api(Arc::new(client)))
    }

    /// Create a server backed by any explorer API implementation.
    pub fn with_api(api: Arc<dyn ExplorerApi>) -> Self {
        Self { dispatcher: Dispatcher::new(api), tool_router: Self::tool_router() }
    }

    /// The dispatcher behind the tools.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn run(&self, call: ToolCall) -> Result<CallToolResult, McpError> {
        Ok(into_call_tool_result(self.dispatcher.execute(call).await))
    }
}

/// Render a tool outcome as MCP content; failures carry `is_error = true`.
pub fn into_call_tool_result(result: ToolResult) -> CallToolResult {
    let content = vec![Content::text(result.to_pretty_json())];
    if result.is_error() {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[tool_router]
impl EtherscanMcpServer {
    #[tool(
        name = "getTokenBalance",
        description = "Get the ERC20 token balance of an address, as a raw integer in the token's smallest unit"
    )]
    pub async fn get_token_balance(
        &self,
        Parameters(input): Parameters<GetTokenBalanceInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::GetTokenBalance(input)).await
    }

    #[tool(
        name = "getTokenDetails",
        description = "Get ERC20 token name, symbol, decimals and total supply"
    )]
    pub async fn get_token_details(
        &self,
        Parameters(input): Parameters<ContractInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::GetTokenDetails(input)).await
    }

    /// Returns the ABI together with function and event summaries.
    #[tool(
        name = "getContractABI",
        description = "Get the ABI of a verified contract with function and event summaries"
    )]
    pub async fn get_contract_abi(
        &self,
        Parameters(input): Parameters<ContractInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::GetContractAbi(input)).await
    }

    #[tool(
        name = "getContractSourceCode",
        description = "Get the verified source code and compiler metadata of a contract"
    )]
    pub async fn get_contract_source_code(
        &self,
        Parameters(input): Parameters<ContractInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::GetContractSourceCode(input)).await
    }

    /// Encodes the call locally, runs it through `eth_call` and decodes the
    /// return data. Nothing is executed on-chain.
    #[tool(
        name = "executeContractMethod",
        description = "Execute a read-only contract method via eth_call. Accepts a method signature (e.g. \"balanceOf(address) returns (uint256)\") or a JSON ABI fragment, and comma-separated arguments"
    )]
    pub async fn execute_contract_method(
        &self,
        Parameters(input): Parameters<ExecuteContractMethodInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::ExecuteContractMethod(input)).await
    }

    #[tool(
        name = "getContractCreation",
        description = "Get the creator address and creation transaction of up to 5 contracts"
    )]
    pub async fn get_contract_creation(
        &self,
        Parameters(input): Parameters<GetContractCreationInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::GetContractCreation(input)).await
    }

    #[tool(
        name = "ethGetTransactionReceipt",
        description = "Get the normalized receipt of a transaction"
    )]
    pub async fn eth_get_transaction_receipt(
        &self,
        Parameters(input): Parameters<GetTransactionReceiptInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::EthGetTransactionReceipt(input)).await
    }

    /// Entries come back in request order; a failing hash yields an error
    /// entry instead of failing the batch.
    #[tool(
        name = "ethGetTransactionReceipts",
        description = "Get receipts for up to 20 transactions in one call, in request order"
    )]
    pub async fn eth_get_transaction_receipts(
        &self,
        Parameters(input): Parameters<GetTransactionReceiptsInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::EthGetTransactionReceipts(input)).await
    }

    #[tool(
        name = "getEventLogs",
        description = "Get event logs by address and/or topics within a block range, most recent first (default 100, max 1000 entries)"
    )]
    pub async fn get_event_logs(
        &self,
        Parameters(input): Parameters<GetEventLogsInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::GetEventLogs(input)).await
    }

    #[tool(
        name = "getTimestampByBlockNumber",
        description = "Get the UNIX timestamp of a block by number or tag"
    )]
    pub async fn get_timestamp_by_block_number(
        &self,
        Parameters(input): Parameters<GetTimestampInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::GetTimestampByBlockNumber(input)).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for EtherscanMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "etherscan-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Etherscan MCP Server. Provides token, contract, transaction, event log and \
                 block queries across Etherscan-supported chains, selected by chainID."
                    .to_string(),
            ),
        }
    }
}
