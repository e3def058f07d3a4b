//! Key loading and balance refresh passes.

use alloy::primitives::Address;

use crate::batch::classify::Operation;
use crate::batch::events::{BatchEvent, BatchSummary, RowTable};
use crate::batch::orchestrator::BatchOrchestrator;
use crate::batch::rows::{BalanceState, RowStatus, SwapRow, TransferRow};
use crate::blockchain::contracts::Erc20;
use crate::blockchain::Wallet;

/// Non-blank secrets of a transfer table.
pub fn transfer_secrets(rows: &[TransferRow]) -> Vec<(usize, String)> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| !row.secret.trim().is_empty())
        .map(|(index, row)| (index, row.secret.clone()))
        .collect()
}

/// Non-blank secrets of a swap table.
pub fn swap_secrets(rows: &[SwapRow]) -> Vec<(usize, String)> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| !row.secret.trim().is_empty())
        .map(|(index, row)| (index, row.secret.clone()))
        .collect()
}

/// Swap rows with a derived address.
pub fn swap_addresses(rows: &[SwapRow]) -> Vec<(usize, Address)> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| row.address.map(|address| (index, address)))
        .collect()
}

impl BatchOrchestrator {
    /// Derive the address for each secret and fetch its native balance.
    ///
    /// Malformed secrets mark the row `InvalidKey` and never get an address.
    /// A failed balance lookup is stored on the row and does not stop the pass.
    pub async fn load_wallets(
        &self,
        table: RowTable,
        secrets: Vec<(usize, String)>,
    ) -> BatchSummary {
        let delay = self.settings.load_delay;
        self.run_pass(Operation::Load, secrets, delay, |(index, secret)| async move {
            let wallet = match Wallet::from_private_key(&secret) {
                Ok(wallet) => wallet,
                Err(_) => {
                    self.set_status(table, index, RowStatus::InvalidKey);
                    return false;
                }
            };

            let address = wallet.address();
            self.emit(BatchEvent::AddressDerived {
                table,
                index,
                address,
            });

            let balance = match self.client.balance(address).await {
                Ok(value) => BalanceState::Loaded(value),
                Err(e) => {
                    tracing::warn!(row = index, %address, error = %e, "Balance lookup failed");
                    BalanceState::Failed(e.detail())
                }
            };
            let ok = balance.loaded().is_some();
            self.emit(BatchEvent::BalanceUpdated {
                table,
                index,
                balance,
            });
            ok
        })
        .await
    }

    /// Fetch the `token` balance of each address.
    pub async fn refresh_token_balances(
        &self,
        token: Address,
        owners: Vec<(usize, Address)>,
    ) -> BatchSummary {
        let delay = self.settings.token_refresh_delay;
        self.run_pass(Operation::TokenRefresh, owners, delay, |(index, owner)| async move {
            let balance = match Erc20::new(self.client.as_ref(), token).balance_of(owner).await {
                Ok(value) => BalanceState::Loaded(value),
                Err(e) => {
                    tracing::warn!(row = index, %owner, error = %e, "Token balance lookup failed");
                    BalanceState::Failed(e.detail())
                }
            };
            let ok = balance.loaded().is_some();
            self.emit(BatchEvent::TokenBalanceUpdated { index, balance });
            ok
        })
        .await
    }
}
