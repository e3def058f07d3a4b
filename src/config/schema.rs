//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for batchtx.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name of the active network (key into `networks`).
    pub network: String,

    /// Selectable networks by name.
    pub networks: BTreeMap<String, NetworkConfig>,

    /// Batch pacing and capacity.
    pub batch: BatchConfig,

    /// Gas fallback limits.
    pub gas: GasConfig,

    /// Router swap parameters.
    pub swap: SwapConfig,

    /// RPC timeouts and confirmation polling.
    pub rpc: RpcConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: "base".to_string(),
            networks: default_networks(),
            batch: BatchConfig::default(),
            gas: GasConfig::default(),
            swap: SwapConfig::default(),
            rpc: RpcConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Look up a network by name.
    pub fn network(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.get(name)
    }

    /// The currently selected network.
    pub fn active_network(&self) -> Option<&NetworkConfig> {
        self.network(&self.network)
    }
}

/// One selectable JSON-RPC network.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NetworkConfig {
    /// Human readable label.
    #[serde(default)]
    pub label: String,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID (e.g., 8453 for Base, 1 for Ethereum mainnet).
    pub chain_id: u64,

    /// Uniswap V3 style swap router. Swaps are unavailable without it.
    #[serde(default)]
    pub router_address: Option<String>,

    /// Wrapped native asset (WETH) contract.
    #[serde(default)]
    pub wrapped_native_address: Option<String>,

    /// Block explorer base URL.
    #[serde(default)]
    pub explorer_url: Option<String>,
}

impl NetworkConfig {
    /// Explorer link for a transaction hash, if an explorer is configured.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }
}

fn network(
    label: &str,
    rpc_url: &str,
    chain_id: u64,
    router: Option<&str>,
    weth: Option<&str>,
    explorer: &str,
) -> NetworkConfig {
    NetworkConfig {
        label: label.to_string(),
        rpc_url: rpc_url.to_string(),
        chain_id,
        router_address: router.map(str::to_string),
        wrapped_native_address: weth.map(str::to_string),
        explorer_url: Some(explorer.to_string()),
    }
}

/// Built-in network table.
pub fn default_networks() -> BTreeMap<String, NetworkConfig> {
    let mut networks = BTreeMap::new();
    networks.insert(
        "base".to_string(),
        network(
            "Base Mainnet",
            "https://mainnet.base.org",
            8453,
            Some("0x2626664c2603336E57B271c5C0b26F421741e481"),
            Some("0x4200000000000000000000000000000000000006"),
            "https://basescan.org",
        ),
    );
    networks.insert(
        "base_sepolia".to_string(),
        network(
            "Base Sepolia Testnet",
            "https://sepolia.base.org",
            84532,
            None,
            None,
            "https://sepolia.basescan.org",
        ),
    );
    networks.insert(
        "mainnet".to_string(),
        network(
            "Ethereum Mainnet",
            "https://eth-mainnet.g.alchemy.com/v2/demo",
            1,
            Some("0xE592427A0AEce92De3Edee1F18E0157C05861564"),
            Some("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
            "https://etherscan.io",
        ),
    );
    networks.insert(
        "sepolia".to_string(),
        network(
            "Ethereum Sepolia Testnet",
            "https://eth-sepolia.g.alchemy.com/v2/demo",
            11155111,
            None,
            None,
            "https://sepolia.etherscan.io",
        ),
    );
    networks.insert(
        "goerli".to_string(),
        network(
            "Ethereum Goerli Testnet",
            "https://eth-goerli.g.alchemy.com/v2/demo",
            5,
            None,
            None,
            "https://goerli.etherscan.io",
        ),
    );
    networks
}

/// Batch pacing and capacity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum rows accepted per batch.
    pub max_rows: usize,

    /// Delay between submitted transactions in milliseconds.
    pub transfer_delay_ms: u64,

    /// Delay between balance lookups when loading keys in milliseconds.
    pub load_delay_ms: u64,

    /// Delay between token balance refreshes in milliseconds.
    pub token_refresh_delay_ms: u64,

    /// Maximum wallets produced by one `generate` call.
    pub max_generated_wallets: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_rows: 30,
            transfer_delay_ms: 1000,
            load_delay_ms: 500,
            token_refresh_delay_ms: 300,
            max_generated_wallets: 100,
        }
    }
}

/// Gas limits used when estimation fails.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Plain value transfer.
    pub transfer_gas_limit: u64,

    /// Router swap.
    pub swap_gas_limit: u64,

    /// Wrapped native withdraw.
    pub unwrap_gas_limit: u64,

    /// ERC-20 approve.
    pub approve_gas_limit: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            transfer_gas_limit: 21_000,
            swap_gas_limit: 500_000,
            unwrap_gas_limit: 100_000,
            approve_gas_limit: 100_000,
        }
    }
}

/// Router swap configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SwapConfig {
    /// Pool fee tier in hundredths of a basis point (10000 = 1%).
    pub fee_tier: u32,

    /// Slippage tolerance in percent. Informational: the router call
    /// carries an explicit minimum output instead.
    pub slippage_percent: f64,

    /// Approve `U256::MAX` instead of the exact sell amount.
    pub unlimited_approval: bool,
}

impl SwapConfig {
    /// A slippage tolerance is configured but the swap carries no output floor.
    pub fn output_unbounded(&self, has_minimum: bool) -> bool {
        self.slippage_percent > 0.0 && !has_minimum
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            fee_tier: 10_000,
            slippage_percent: 0.5,
            unlimited_approval: false,
        }
    }
}

/// RPC timeouts and confirmation polling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum time to wait for a receipt in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub confirmation_poll_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            confirmation_timeout_secs: 180,
            confirmation_poll_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format (`pretty` or `json`).
    pub log_format: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
