//! Display names for well-known chain ids.

/// Get the network name for a chain id.
///
/// Unknown chains render as `Chain ID: <id>`; the explorer decides whether it
/// actually serves them.
pub fn network_name(chain_id: u64) -> String {
    let name = match chain_id {
        1 => "Ethereum Mainnet",
        5 => "Goerli Testnet",
        10 => "Optimism",
        56 => "BSC Mainnet",
        97 => "BSC Testnet",
        137 => "Polygon Mainnet",
        250 => "Fantom Opera",
        1101 => "Polygon zkEVM",
        4002 => "Fantom Testnet",
        8453 => "Base",
        42161 => "Arbitrum One",
        43113 => "Avalanche Fuji Testnet",
        43114 => "Avalanche C-Chain",
        59144 => "Linea",
        80001 => "Mumbai Testnet",
        421614 => "Arbitrum Sepolia",
        534352 => "Scroll",
        7777777 => "Zora",
        11155111 => "Sepolia Testnet",
        11155420 => "Optimism Sepolia",
        _ => return format!("Chain ID: {}", chain_id),
    };
    name.to_string()
}
