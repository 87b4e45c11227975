//! ABI encoding and decoding for read-only contract calls.
//!
//! Translates a method description (human-readable signature or JSON ABI
//! fragment) and string arguments into call data, and raw return data back into
//! JSON values.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier},
    hex,
    json_abi::Function,
    primitives::Address,
};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// A read-only contract call: target, method and its string arguments.
#[derive(Debug, Clone)]
pub struct ContractCallSpec {
    /// Contract to call.
    pub address: Address,
    /// Parsed method description.
    pub function: Function,
    /// Raw argument values, one per declared input.
    pub arguments: Vec<String>,
}

impl ContractCallSpec {
    /// Parse a method description and its comma-separated arguments.
    ///
    /// `method` is either a signature such as `balanceOf(address) returns (uint256)`
    /// or a JSON ABI function fragment.
    pub fn parse(address: Address, method: &str, params: Option<&str>) -> Result<Self> {
        let function = parse_function(method)?;
        let arguments = params.map(split_arguments).unwrap_or_default();

        if arguments.len() != function.inputs.len() {
            return Err(AppError::Encoding(format!(
                "{} expects {} argument(s), got {}",
                function.signature(),
                function.inputs.len(),
                arguments.len()
            )));
        }

        Ok(Self { address, function, arguments })
    }

    /// Canonical signature, e.g. `balanceOf(address)`.
    pub fn signature(&self) -> String {
        self.function.signature()
    }

    /// Declared return types, e.g. `["uint256"]`.
    pub fn return_types(&self) -> Vec<String> {
        self.function.outputs.iter().map(|p| p.selector_type().into_owned()).collect()
    }

    /// Coerce the string arguments into typed ABI values.
    pub fn typed_arguments(&self) -> Result<Vec<DynSolValue>> {
        self.function
            .inputs
            .iter()
            .zip(&self.arguments)
            .map(|(param, raw)| {
                let ty = param.resolve().map_err(|e| {
                    AppError::Encoding(format!("Unsupported input type '{}': {}", param.ty, e))
                })?;
                coerce_argument(&ty, raw)
            })
            .collect()
    }

    /// Encode selector and arguments into call data.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let values = self.typed_arguments()?;
        self.function
            .abi_encode_input(&values)
            .map_err(|e| AppError::Encoding(format!("Failed to encode {}: {}", self.signature(), e)))
    }

    /// Decode raw return data into the declared output types.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<DynSolValue>> {
        if self.function.outputs.is_empty() {
            return Ok(Vec::new());
        }

        if data.is_empty() {
            return Err(AppError::Decoding(format!(
                "Empty return data for {}; the contract may not implement this method",
                self.signature()
            )));
        }

        self.function
            .abi_decode_output(data)
            .map_err(|e| AppError::Decoding(format!("Failed to decode {}: {}", self.signature(), e)))
    }

    /// Render decoded values: a single output as a scalar, several as an object
    /// keyed by output name (or `output_<i>` when unnamed).
    pub fn outputs_to_json(&self, values: &[DynSolValue]) -> Value {
        match values {
            [] => Value::Null,
            [single] => value_to_json(single),
            many => {
                let mut object = Map::new();
                for (i, (value, param)) in many.iter().zip(&self.function.outputs).enumerate() {
                    let key = if param.name.is_empty() {
                        format!("output_{}", i)
                    } else {
                        param.name.clone()
                    };
                    object.insert(key, value_to_json(value));
                }
                Value::Object(object)
            }
        }
    }
}

/// Parse a method description into an ABI function.
pub fn parse_function(method: &str) -> Result<Function> {
    let method = method.trim();
    if method.is_empty() {
        return Err(AppError::Encoding("Method signature cannot be empty".into()));
    }

    if method.starts_with('{') {
        serde_json::from_str::<Function>(method)
            .map_err(|e| AppError::Encoding(format!("Invalid method ABI JSON: {}", e)))
    } else {
        Function::parse(method)
            .map_err(|e| AppError::Encoding(format!("Invalid method signature '{}': {}", method, e)))
    }
}

/// Split a comma-separated argument list on top-level commas.
///
/// Commas inside brackets, parentheses or double quotes do not split.
pub fn split_arguments(params: &str) -> Vec<String> {
    let params = params.trim();
    if params.is_empty() {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;

    for c in params.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '[' | '(' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ']' | ')' if !in_quotes => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if !in_quotes && depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    args.push(current.trim().to_string());
    args
}

/// Coerce a single string argument into a typed ABI value.
pub fn coerce_argument(ty: &DynSolType, raw: &str) -> Result<DynSolValue> {
    let raw = raw.trim();

    match ty {
        DynSolType::Bool => match raw.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(DynSolValue::Bool(true)),
            "false" | "0" | "no" => Ok(DynSolValue::Bool(false)),
            _ => Err(AppError::Encoding(format!("Invalid bool value '{}'", raw))),
        },
        DynSolType::String => Ok(DynSolValue::String(strip_quotes(raw).to_string())),
        _ => ty
            .coerce_str(raw)
            .map_err(|e| AppError::Encoding(format!("Invalid {} value '{}': {}", ty, raw, e))),
    }
}

fn strip_quotes(raw: &str) -> &str {
    raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(raw)
}

/// Render a decoded ABI value as JSON.
///
/// Integers are rendered as decimal strings so 256-bit values survive intact.
pub fn value_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Address(address) => Value::String(address.to_checksum(None)),
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::FixedBytes(word, size) => Value::String(hex::encode_prefixed(&word[..*size])),
        DynSolValue::Bytes(bytes) => Value::String(hex::encode_prefixed(bytes)),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(items)
        | DynSolValue::FixedArray(items)
        | DynSolValue::Tuple(items) => Value::Array(items.iter().map(value_to_json).collect()),
        other => Value::String(hex::encode_prefixed(other.abi_encode())),
    }
}
