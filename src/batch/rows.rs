//! Row types and per-row status.

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, TxHash, U256};
use serde::Deserialize;

/// Length of the hash prefix shown in statuses (`0x` plus 8 hex digits).
pub const SHORT_ID_LEN: usize = 10;

/// Abbreviated transaction hash, e.g. `0x1234abcd...`.
pub fn short_id(hash: &TxHash) -> String {
    let full = alloy::hex::encode_prefixed(hash);
    format!("{}...", &full[..SHORT_ID_LEN])
}

/// Lifecycle of one row.
///
/// `Empty → Processing → (Pending → Success) | Error`, plus the swap
/// intermediates. Terminal states are reported by [`RowStatus::is_terminal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RowStatus {
    #[default]
    Empty,
    InvalidKey,
    Processing,
    Pending(TxHash),
    Success(TxHash),
    Error(String),
    Approving,
    ApprovalPending(TxHash),
    Approved,
    Swapping,
    SwapPending(TxHash),
    Unwrapping(TxHash),
    Sold { percent: u8 },
    NoConversionNeeded,
}

impl RowStatus {
    /// The row will not change again during the current pass.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RowStatus::Success(_)
                | RowStatus::Error(_)
                | RowStatus::InvalidKey
                | RowStatus::Approved
                | RowStatus::Sold { .. }
                | RowStatus::NoConversionNeeded
        )
    }

    /// Terminal and successful.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RowStatus::Success(_)
                | RowStatus::Approved
                | RowStatus::Sold { .. }
                | RowStatus::NoConversionNeeded
        )
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowStatus::Empty => Ok(()),
            RowStatus::InvalidKey => write!(f, "invalid key"),
            RowStatus::Processing => write!(f, "processing"),
            RowStatus::Pending(hash) => write!(f, "pending: {}", short_id(hash)),
            RowStatus::Success(hash) => write!(f, "success: {}", short_id(hash)),
            RowStatus::Error(message) => write!(f, "error: {}", message),
            RowStatus::Approving => write!(f, "approving"),
            RowStatus::ApprovalPending(hash) => {
                write!(f, "approval pending: {}", short_id(hash))
            }
            RowStatus::Approved => write!(f, "approved"),
            RowStatus::Swapping => write!(f, "swapping"),
            RowStatus::SwapPending(hash) => write!(f, "swap pending: {}", short_id(hash)),
            RowStatus::Unwrapping(hash) => write!(f, "unwrapping: {}", short_id(hash)),
            RowStatus::Sold { percent } => write!(f, "sold {}% to native", percent),
            RowStatus::NoConversionNeeded => {
                write!(f, "swap completed, no conversion needed")
            }
        }
    }
}

/// Cached balance shown next to a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BalanceState {
    #[default]
    Unknown,
    Loaded(U256),
    Failed(String),
}

impl BalanceState {
    pub fn loaded(&self) -> Option<U256> {
        match self {
            BalanceState::Loaded(value) => Some(*value),
            _ => None,
        }
    }
}

impl std::fmt::Display for BalanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceState::Unknown => Ok(()),
            BalanceState::Loaded(wei) => write!(f, "{}", format_ether(*wei)),
            BalanceState::Failed(_) => write!(f, "Error"),
        }
    }
}

/// One value transfer: secret (multi-key mode only), destination, amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransferRow {
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub amount: String,
    #[serde(skip)]
    pub source_address: Option<Address>,
    #[serde(skip)]
    pub balance: BalanceState,
    #[serde(skip)]
    pub status: RowStatus,
}

impl TransferRow {
    /// All user-entered fields are blank.
    pub fn is_blank(&self) -> bool {
        self.secret.trim().is_empty()
            && self.destination.trim().is_empty()
            && self.amount.trim().is_empty()
    }
}

/// One wallet taking part in router swaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SwapRow {
    #[serde(default)]
    pub secret: String,
    /// Native amount spent by a buy.
    #[serde(default, rename = "amount")]
    pub native_amount: String,
    #[serde(skip)]
    pub address: Option<Address>,
    #[serde(skip)]
    pub balance: BalanceState,
    #[serde(skip)]
    pub token_balance: BalanceState,
    #[serde(skip)]
    pub status: RowStatus,
}

impl SwapRow {
    pub fn is_blank(&self) -> bool {
        self.secret.trim().is_empty() && self.native_amount.trim().is_empty()
    }
}
