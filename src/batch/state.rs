//! Application state: row tables, results, caches.
//!
//! Owned by one task. Updates from the orchestrator arrive as
//! [`BatchEvent`]s and are applied with [`AppState::apply`].

use crate::batch::eligibility::InputError;
use crate::batch::events::{BatchEvent, BatchSummary, RowTable, TransferRecord};
use crate::batch::rows::{BalanceState, RowStatus, SwapRow, TransferRow};
use crate::token::{TokenCache, TokenDescriptor};
use crate::wallets::GeneratedWallet;

#[derive(Debug, Clone)]
pub struct AppState {
    network: String,
    capacity: usize,
    pub transfers: Vec<TransferRow>,
    pub swaps: Vec<SwapRow>,
    /// Token selected for the swap table.
    pub token: Option<TokenDescriptor>,
    pub tokens: TokenCache,
    pub records: Vec<TransferRecord>,
    pub last_summary: Option<BatchSummary>,
    pub progress: Option<(usize, usize)>,
    pub generated: Vec<GeneratedWallet>,
}

impl AppState {
    /// Empty state with `capacity` blank rows in each table.
    pub fn new(network: impl Into<String>, capacity: usize) -> Self {
        Self {
            network: network.into(),
            capacity,
            transfers: vec![TransferRow::default(); capacity],
            swaps: vec![SwapRow::default(); capacity],
            token: None,
            tokens: TokenCache::default(),
            records: Vec::new(),
            last_summary: None,
            progress: None,
            generated: Vec::new(),
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Replace the transfer table, padding with blank rows up to capacity.
    pub fn set_transfer_rows(&mut self, rows: Vec<TransferRow>) -> Result<(), InputError> {
        self.transfers = self.padded(rows)?;
        Ok(())
    }

    /// Replace the swap table, padding with blank rows up to capacity.
    pub fn set_swap_rows(&mut self, rows: Vec<SwapRow>) -> Result<(), InputError> {
        self.swaps = self.padded(rows)?;
        Ok(())
    }

    fn padded<R: Default + Clone>(&self, mut rows: Vec<R>) -> Result<Vec<R>, InputError> {
        if rows.len() > self.capacity {
            return Err(InputError::TooManyRows {
                count: rows.len(),
                max: self.capacity,
            });
        }
        rows.resize(self.capacity, R::default());
        Ok(rows)
    }

    /// Switch networks. Balances, token metadata and token balances belong
    /// to the old chain and are dropped; rows and statuses are kept.
    ///
    /// Returns `false` when `network` is already active.
    pub fn select_network(&mut self, network: &str) -> bool {
        if self.network == network {
            return false;
        }

        tracing::info!(from = %self.network, to = %network, "Network changed");
        self.network = network.to_string();
        self.token = None;
        self.tokens.clear();
        for row in &mut self.transfers {
            row.balance = BalanceState::Unknown;
        }
        for row in &mut self.swaps {
            row.balance = BalanceState::Unknown;
            row.token_balance = BalanceState::Unknown;
        }
        true
    }

    /// Clear statuses and results before a new pass.
    pub fn reset_results(&mut self) {
        self.records.clear();
        self.last_summary = None;
        self.progress = None;
        for row in &mut self.transfers {
            row.status = RowStatus::Empty;
        }
        for row in &mut self.swaps {
            row.status = RowStatus::Empty;
        }
    }

    pub fn apply(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::RowStatus {
                table,
                index,
                status,
            } => {
                let invalid = status == RowStatus::InvalidKey;
                match table {
                    RowTable::Transfers => {
                        if let Some(row) = self.transfers.get_mut(index) {
                            if invalid {
                                row.source_address = None;
                                row.balance = BalanceState::Unknown;
                            }
                            row.status = status;
                        }
                    }
                    RowTable::Swaps => {
                        if let Some(row) = self.swaps.get_mut(index) {
                            if invalid {
                                row.address = None;
                                row.balance = BalanceState::Unknown;
                                row.token_balance = BalanceState::Unknown;
                            }
                            row.status = status;
                        }
                    }
                }
            }
            BatchEvent::AddressDerived {
                table,
                index,
                address,
            } => match table {
                RowTable::Transfers => {
                    if let Some(row) = self.transfers.get_mut(index) {
                        row.source_address = Some(address);
                    }
                }
                RowTable::Swaps => {
                    if let Some(row) = self.swaps.get_mut(index) {
                        row.address = Some(address);
                    }
                }
            },
            BatchEvent::BalanceUpdated {
                table,
                index,
                balance,
            } => match table {
                RowTable::Transfers => {
                    if let Some(row) = self.transfers.get_mut(index) {
                        row.balance = balance;
                    }
                }
                RowTable::Swaps => {
                    if let Some(row) = self.swaps.get_mut(index) {
                        row.balance = balance;
                    }
                }
            },
            BatchEvent::TokenBalanceUpdated { index, balance } => {
                if let Some(row) = self.swaps.get_mut(index) {
                    row.token_balance = balance;
                }
            }
            BatchEvent::Recorded(record) => self.records.push(record),
            BatchEvent::Progress { completed, total } => {
                self.progress = Some((completed, total));
            }
            BatchEvent::Completed(summary) => self.last_summary = Some(summary),
        }
    }
}
