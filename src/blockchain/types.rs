//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node refused the signed transaction.
    #[error("Transaction submission failed: {0}")]
    Submission(String),

    /// Transaction was not mined within the confirmation window.
    #[error("Transaction {0} not confirmed after {1} seconds")]
    ConfirmationTimeout(TxHash, u64),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Contract call or return-data decoding failed.
    #[error("Contract error: {0}")]
    Contract(String),

    /// Invalid RPC URL for the selected network.
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),
}

impl BlockchainError {
    /// The underlying message without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            BlockchainError::Rpc(msg)
            | BlockchainError::Submission(msg)
            | BlockchainError::Reverted(msg)
            | BlockchainError::Wallet(msg)
            | BlockchainError::Contract(msg)
            | BlockchainError::InvalidRpcUrl(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Fee parameters reported by the node.
///
/// Mirrors `eth_feeHistory` based EIP-1559 estimation; both EIP-1559 fields
/// are `None` on chains without a base fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeData {
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

impl FeeData {
    /// EIP-1559 fee pair when the node reports both halves.
    pub fn eip1559(&self) -> Option<(u128, u128)> {
        match (self.max_fee_per_gas, self.max_priority_fee_per_gas) {
            (Some(max_fee), Some(priority)) => Some((max_fee, priority)),
            _ => None,
        }
    }
}

/// Fee fields chosen for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPricing {
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
    Legacy {
        gas_price: u128,
    },
}

/// Gas limit plus fee fields for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
    pub gas_limit: u64,
    pub pricing: GasPricing,
    /// True when the limit came from the configured fallback.
    pub fallback: bool,
}

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction is mined and succeeded.
    Confirmed { block_number: u64 },
    /// Transaction was mined but failed.
    Failed(String),
}
