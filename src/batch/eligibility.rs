//! Input validation and eligible-job selection.
//!
//! Everything here runs before any remote call. A row becomes a job only if
//! its secret parses, its address is `0x` plus 40 hex digits and its amount
//! is positive; every other row is left out of the batch.

use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::batch::rows::{RowStatus, SwapRow, TransferRow};
use crate::blockchain::Wallet;

/// Decimals of the native asset.
pub const NATIVE_DECIMALS: u8 = 18;

/// Errors caught before a batch touches the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Amount must be positive: '{0}'")]
    NonPositiveAmount(String),

    #[error("Invalid private key")]
    InvalidKey,

    #[error("No eligible rows to submit")]
    NoEligibleRows,

    #[error("{count} rows exceeds the maximum of {max}")]
    TooManyRows { count: usize, max: usize },

    #[error("Swaps are not available on network '{0}'")]
    SwapsUnsupported(String),

    #[error("Sell percentage must be between 1 and 100, got {0}")]
    InvalidPercent(u8),

    #[error("Wallet count must be between 1 and {max}, got {requested}")]
    InvalidWalletCount { requested: usize, max: usize },

    #[error("No wallets to export")]
    NothingToExport,
}

/// `^0x[a-fA-F0-9]{40}$`.
pub fn is_valid_address(candidate: &str) -> bool {
    candidate.len() == 42
        && candidate.starts_with("0x")
        && candidate[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parse a 20-byte hex address in the strict form accepted by the batch.
pub fn parse_address(candidate: &str) -> Result<Address, InputError> {
    let trimmed = candidate.trim();
    if !is_valid_address(trimmed) {
        return Err(InputError::InvalidAddress(trimmed.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| InputError::InvalidAddress(trimmed.to_string()))
}

/// Parse a decimal amount into base units, rejecting zero and negatives.
pub fn parse_positive_amount(amount: &str, decimals: u8) -> Result<U256, InputError> {
    let trimmed = amount.trim();
    match parse_units(trimmed, decimals) {
        Ok(ParseUnits::U256(value)) if !value.is_zero() => Ok(value),
        Ok(_) => Err(InputError::NonPositiveAmount(trimmed.to_string())),
        Err(_) => Err(InputError::InvalidAmount(trimmed.to_string())),
    }
}

/// One value transfer ready for submission.
#[derive(Debug, Clone)]
pub struct TransferJob {
    /// Row index in the caller's table.
    pub index: usize,
    pub wallet: Wallet,
    pub to: Address,
    /// Amount as entered, for reporting.
    pub amount: String,
    /// Amount in wei.
    pub value: U256,
}

/// One wallet ready for a router operation.
#[derive(Debug, Clone)]
pub struct SwapJob {
    pub index: usize,
    pub wallet: Wallet,
    /// Native amount in wei; zero for sells and approvals.
    pub amount_in: U256,
}

/// Jobs that passed the filter plus rows rejected with an explicit status.
#[derive(Debug, Clone)]
pub struct Selection<J> {
    pub jobs: Vec<J>,
    pub rejected: Vec<(usize, RowStatus)>,
}

impl<J> Selection<J> {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

fn transfer_target(row: &TransferRow) -> Option<(Address, U256)> {
    let to = parse_address(&row.destination).ok()?;
    let value = parse_positive_amount(&row.amount, NATIVE_DECIMALS).ok()?;
    Some((to, value))
}

/// One secret paying many recipients.
///
/// # Errors
/// `InvalidKey` when the shared secret does not parse; nothing is selected.
pub fn select_single_key(
    secret: &str,
    rows: &[TransferRow],
) -> Result<Selection<TransferJob>, InputError> {
    let wallet = Wallet::from_private_key(secret).map_err(|_| InputError::InvalidKey)?;

    let jobs = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let (to, value) = transfer_target(row)?;
            Some(TransferJob {
                index,
                wallet: wallet.clone(),
                to,
                amount: row.amount.trim().to_string(),
                value,
            })
        })
        .collect();

    Ok(Selection {
        jobs,
        rejected: Vec::new(),
    })
}

/// Each row carries its own secret.
///
/// Rows with a malformed secret are rejected as `InvalidKey`; rows with a
/// bad destination or amount are silently left out.
pub fn select_multi_key(rows: &[TransferRow]) -> Selection<TransferJob> {
    let mut selection = Selection {
        jobs: Vec::new(),
        rejected: Vec::new(),
    };

    for (index, row) in rows.iter().enumerate() {
        if row.secret.trim().is_empty() {
            continue;
        }
        let wallet = match Wallet::from_private_key(&row.secret) {
            Ok(wallet) => wallet,
            Err(_) => {
                selection.rejected.push((index, RowStatus::InvalidKey));
                continue;
            }
        };
        if let Some((to, value)) = transfer_target(row) {
            selection.jobs.push(TransferJob {
                index,
                wallet,
                to,
                amount: row.amount.trim().to_string(),
                value,
            });
        }
    }

    selection
}

/// Swap rows for a buy: valid secret and a positive native amount.
pub fn select_buys(rows: &[SwapRow]) -> Selection<SwapJob> {
    select_swap_rows(rows, true)
}

/// Swap rows for a sell or approval: valid secret only.
pub fn select_sells(rows: &[SwapRow]) -> Selection<SwapJob> {
    select_swap_rows(rows, false)
}

fn select_swap_rows(rows: &[SwapRow], needs_amount: bool) -> Selection<SwapJob> {
    let mut selection = Selection {
        jobs: Vec::new(),
        rejected: Vec::new(),
    };

    for (index, row) in rows.iter().enumerate() {
        if row.secret.trim().is_empty() {
            continue;
        }
        let wallet = match Wallet::from_private_key(&row.secret) {
            Ok(wallet) => wallet,
            Err(_) => {
                selection.rejected.push((index, RowStatus::InvalidKey));
                continue;
            }
        };
        let amount_in = if needs_amount {
            match parse_positive_amount(&row.native_amount, NATIVE_DECIMALS) {
                Ok(value) => value,
                Err(_) => continue,
            }
        } else {
            U256::ZERO
        };
        selection.jobs.push(SwapJob {
            index,
            wallet,
            amount_in,
        });
    }

    selection
}
