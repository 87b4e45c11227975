//! Contract-related types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Summary of an ABI function entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiFunctionSummary {
    /// Function name.
    pub name: String,
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub signature: String,
    /// 4-byte selector (hex).
    pub selector: String,
    /// State mutability (`view`, `pure`, `nonpayable`, `payable`).
    pub state_mutability: String,
    /// Declared output types.
    pub outputs: Vec<String>,
}

/// Summary of an ABI event entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiEventSummary {
    /// Event name.
    pub name: String,
    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub signature: String,
    /// Topic0 hash (hex).
    pub topic: String,
    /// Whether the event is anonymous.
    pub anonymous: bool,
}

/// Contract ABI response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAbi {
    /// Network display name.
    pub network: String,
    /// Contract address.
    pub contract_address: String,
    /// The ABI as published (parsed JSON when possible, otherwise the raw string).
    pub abi: Value,
    /// Function summaries.
    pub functions: Vec<AbiFunctionSummary>,
    /// Event summaries.
    pub events: Vec<AbiEventSummary>,
}

/// Entry of the `contract/getsourcecode` result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawSourceInfo {
    pub source_code: String,
    #[serde(rename = "ABI")]
    pub abi: String,
    pub contract_name: String,
    pub compiler_version: String,
    pub optimization_used: String,
    pub runs: String,
    pub constructor_arguments: String,
    #[serde(rename = "EVMVersion")]
    pub evm_version: String,
    pub library: String,
    pub license_type: String,
    pub proxy: String,
    pub implementation: String,
    pub swarm_source: String,
}

/// Contract source code response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSource {
    /// Network display name.
    pub network: String,
    /// Contract address.
    pub contract_address: String,
    /// Whether the explorer has verified source for this contract.
    pub verified: bool,
    /// Verbatim source text (empty when unverified).
    pub source_code: String,
    pub contract_name: String,
    pub compiler_version: String,
    pub optimization_used: bool,
    pub runs: String,
    pub constructor_arguments: String,
    pub evm_version: String,
    pub library: String,
    pub license_type: String,
    /// Whether the contract is a proxy.
    pub proxy: bool,
    /// Implementation address for proxies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    pub swarm_source: String,
}

impl ContractSource {
    /// Build the response from the raw explorer entry.
    pub fn from_raw(network: String, contract_address: String, raw: RawSourceInfo) -> Self {
        let verified = !raw.source_code.is_empty();
        let implementation = Some(raw.implementation).filter(|s| !s.is_empty());

        Self {
            network,
            contract_address,
            verified,
            source_code: raw.source_code,
            contract_name: raw.contract_name,
            compiler_version: raw.compiler_version,
            optimization_used: raw.optimization_used == "1",
            runs: raw.runs,
            constructor_arguments: raw.constructor_arguments,
            evm_version: raw.evm_version,
            library: raw.library,
            license_type: raw.license_type,
            proxy: raw.proxy == "1",
            implementation,
            swarm_source: raw.swarm_source,
        }
    }
}

/// Creation record of a single contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCreation {
    #[serde(rename(deserialize = "contractAddress"))]
    pub contract_address: String,
    #[serde(rename(deserialize = "contractCreator"))]
    pub contract_creator: String,
    #[serde(rename(deserialize = "txHash"))]
    pub tx_hash: String,
}

/// Contract creation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractCreationInfo {
    /// Network display name.
    pub network: String,
    /// Addresses in the order they were requested.
    pub requested_addresses: Vec<String>,
    /// Creation records returned by the explorer.
    pub creations: Vec<ContractCreation>,
}

/// Result of a read-only contract method execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractCallResult {
    /// Network display name.
    pub network: String,
    /// Contract address.
    pub contract_address: String,
    /// Canonical function signature.
    pub function_signature: String,
    /// Block tag the call was executed against.
    pub block_tag: String,
    /// Encoded call data (hex).
    pub encoded_call_data: String,
    /// Raw return data (hex).
    pub raw_result: String,
    /// Declared output types.
    pub output_types: Vec<String>,
    /// Decoded return value(s).
    pub decoded_result: Value,
}
