//! Contract query and execution service.

use alloy::{
    eips::BlockNumberOrTag,
    hex,
    json_abi::{JsonAbi, StateMutability},
    primitives::Address,
};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    ethereum::{proxy_tag, ContractCallSpec},
    etherscan::{network_name, ChainRequest, ExplorerApi},
    types::{
        AbiEventSummary, AbiFunctionSummary, ContractAbi, ContractCallResult, ContractCreation,
        ContractCreationInfo, ContractSource, RawSourceInfo,
    },
};

/// Maximum number of contracts per `getcontractcreation` request.
pub const MAX_CREATION_ADDRESSES: usize = 5;

/// Service for contract metadata and read-only calls.
#[derive(Clone)]
pub struct ContractService {
    api: Arc<dyn ExplorerApi>,
}

impl ContractService {
    /// Create a new contract service.
    pub fn new(api: Arc<dyn ExplorerApi>) -> Self {
        Self { api }
    }

    /// Get the published ABI of a verified contract.
    pub async fn get_contract_abi(&self, chain_id: u64, contract: Address) -> Result<ContractAbi> {
        tracing::debug!(chain_id, contract = %contract, "Querying contract ABI");

        let request =
            ChainRequest::new(chain_id, "contract", "getabi").param("address", contract.to_string());

        let result = self.api.call(request).await.map_err(|e| not_verified(e, contract))?;
        let raw = result.as_str().unwrap_or_default();

        if raw.is_empty() || is_not_verified_message(raw) {
            return Err(AppError::NotVerified(contract.to_string()));
        }

        let (abi, functions, events) = match serde_json::from_str::<JsonAbi>(raw) {
            Ok(parsed) => {
                let value = serde_json::from_str::<Value>(raw)
                    .unwrap_or_else(|_| Value::String(raw.to_string()));
                (value, summarize_functions(&parsed), summarize_events(&parsed))
            }
            Err(e) => {
                tracing::warn!(contract = %contract, error = %e, "ABI could not be parsed");
                (Value::String(raw.to_string()), Vec::new(), Vec::new())
            }
        };

        Ok(ContractAbi {
            network: network_name(chain_id),
            contract_address: contract.to_string(),
            abi,
            functions,
            events,
        })
    }

    /// Get the verified source code and compiler metadata of a contract.
    pub async fn get_contract_source_code(
        &self,
        chain_id: u64,
        contract: Address,
    ) -> Result<ContractSource> {
        tracing::debug!(chain_id, contract = %contract, "Querying contract source code");

        let request = ChainRequest::new(chain_id, "contract", "getsourcecode")
            .param("address", contract.to_string());
        let result = self.api.call(request).await?;

        let entry = match result {
            Value::Array(entries) => entries.into_iter().next(),
            Value::Object(_) => Some(result),
            _ => None,
        };

        let raw: RawSourceInfo = match entry {
            Some(entry) => serde_json::from_value(entry)
                .map_err(|e| AppError::Decoding(format!("Unexpected source code entry: {}", e)))?,
            None => RawSourceInfo::default(),
        };

        Ok(ContractSource::from_raw(network_name(chain_id), contract.to_string(), raw))
    }

    /// Get creator address and creation transaction for up to five contracts.
    pub async fn get_contract_creation(
        &self,
        chain_id: u64,
        contracts: &[Address],
    ) -> Result<ContractCreationInfo> {
        if contracts.is_empty() || contracts.len() > MAX_CREATION_ADDRESSES {
            return Err(AppError::SchemaValidation(format!(
                "Between 1 and {} contract addresses required, got {}",
                MAX_CREATION_ADDRESSES,
                contracts.len()
            )));
        }

        let requested: Vec<String> = contracts.iter().map(ToString::to_string).collect();
        tracing::debug!(chain_id, contracts = ?requested, "Querying contract creation");

        let request = ChainRequest::new(chain_id, "contract", "getcontractcreation")
            .param("contractaddresses", requested.join(","));
        let result = self.api.call(request).await?;

        let creations: Vec<ContractCreation> = match result {
            Value::Array(_) => serde_json::from_value(result),
            Value::Object(_) => serde_json::from_value(result).map(|c| vec![c]),
            Value::Null => Ok(Vec::new()),
            other => {
                return Err(AppError::Decoding(format!("Unexpected creation result: {}", other)))
            }
        }
        .map_err(|e| AppError::Decoding(format!("Unexpected creation entry: {}", e)))?;

        Ok(ContractCreationInfo {
            network: network_name(chain_id),
            requested_addresses: requested,
            creations,
        })
    }

    /// Execute a read-only contract method through `eth_call`.
    pub async fn execute_contract_method(
        &self,
        chain_id: u64,
        spec: &ContractCallSpec,
        tag: BlockNumberOrTag,
    ) -> Result<ContractCallResult> {
        let call_data = hex::encode_prefixed(spec.encode()?);
        let block_tag = proxy_tag(tag);

        tracing::debug!(
            chain_id,
            contract = %spec.address,
            function = %spec.signature(),
            tag = %block_tag,
            "Executing contract method"
        );

        let request = ChainRequest::new(chain_id, "proxy", "eth_call")
            .param("to", spec.address.to_string())
            .param("data", call_data.clone())
            .param("tag", block_tag.clone());
        let result = self.api.call(request).await?;

        let raw_result = result
            .as_str()
            .ok_or_else(|| AppError::Decoding(format!("Unexpected eth_call result: {}", result)))?
            .to_string();
        let data = hex::decode(&raw_result)?;
        let values = spec.decode(&data)?;

        Ok(ContractCallResult {
            network: network_name(chain_id),
            contract_address: spec.address.to_string(),
            function_signature: spec.signature(),
            block_tag,
            encoded_call_data: call_data,
            raw_result,
            output_types: spec.return_types(),
            decoded_result: spec.outputs_to_json(&values),
        })
    }
}

fn is_not_verified_message(message: &str) -> bool {
    message.to_lowercase().contains("not verified")
}

fn not_verified(err: AppError, contract: Address) -> AppError {
    match err {
        AppError::UpstreamRejected(msg) if is_not_verified_message(&msg) => {
            AppError::NotVerified(contract.to_string())
        }
        other => other,
    }
}

fn summarize_functions(abi: &JsonAbi) -> Vec<AbiFunctionSummary> {
    abi.functions()
        .map(|f| AbiFunctionSummary {
            name: f.name.clone(),
            signature: f.signature(),
            selector: f.selector().to_string(),
            state_mutability: mutability_name(f.state_mutability).to_string(),
            outputs: f.outputs.iter().map(|p| p.selector_type().into_owned()).collect(),
        })
        .collect()
}

fn summarize_events(abi: &JsonAbi) -> Vec<AbiEventSummary> {
    abi.events()
        .map(|e| AbiEventSummary {
            name: e.name.clone(),
            signature: e.signature(),
            topic: e.selector().to_string(),
            anonymous: e.anonymous,
        })
        .collect()
}

fn mutability_name(mutability: StateMutability) -> &'static str {
    match mutability {
        StateMutability::Pure => "pure",
        StateMutability::View => "view",
        StateMutability::NonPayable => "nonpayable",
        StateMutability::Payable => "payable",
    }
}
