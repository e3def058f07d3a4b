//! Native value transfers, single-key and multi-key.

use alloy::primitives::Address;

use crate::batch::classify::Operation;
use crate::batch::eligibility::{InputError, Selection, TransferJob};
use crate::batch::events::{BatchEvent, BatchSummary, RowTable, TransferRecord};
use crate::batch::orchestrator::BatchOrchestrator;
use crate::batch::rows::{BalanceState, RowStatus};
use crate::blockchain::contracts::transfer_request;

impl BatchOrchestrator {
    /// Submit every selected transfer in row order.
    ///
    /// Rejected rows are marked first. Each job is confirmed before the next
    /// one starts, so jobs sharing a key never race on the nonce.
    ///
    /// # Errors
    /// `NoEligibleRows` when nothing passed selection; no transaction is sent.
    pub async fn run_transfers(
        &self,
        selection: Selection<TransferJob>,
    ) -> Result<BatchSummary, InputError> {
        self.reject(RowTable::Transfers, &selection.rejected);
        if selection.is_empty() {
            return Err(InputError::NoEligibleRows);
        }

        let delay = self.settings.transfer_delay;
        Ok(self
            .run_pass(Operation::Transfer, selection.jobs, delay, |job| {
                self.transfer_one(job)
            })
            .await)
    }

    async fn transfer_one(&self, job: TransferJob) -> bool {
        let table = RowTable::Transfers;
        self.set_status(table, job.index, RowStatus::Processing);

        let from = job.wallet.address();
        let mut record = TransferRecord {
            index: job.index,
            from,
            to: job.to,
            amount: job.amount.clone(),
            hash: None,
            error: None,
        };

        let tx = transfer_request(from, job.to, job.value);
        let fallback = self.settings.gas.transfer_gas_limit;

        let outcome = match self.submit(&job.wallet, tx, fallback).await {
            Ok(tx_hash) => {
                record.hash = Some(tx_hash);
                self.set_status(table, job.index, RowStatus::Pending(tx_hash));
                self.confirm(tx_hash).await.map(|_| tx_hash)
            }
            Err(e) => Err(e),
        };

        let ok = match outcome {
            Ok(tx_hash) => {
                self.set_status(table, job.index, RowStatus::Success(tx_hash));
                self.refresh_sender_balance(job.index, from).await;
                true
            }
            Err(e) => {
                record.error = Some(self.fail(table, job.index, Operation::Transfer, &e));
                false
            }
        };

        self.emit(BatchEvent::Recorded(record));
        ok
    }

    /// Re-read the sender's native balance after a confirmed transfer.
    async fn refresh_sender_balance(&self, index: usize, from: Address) {
        let balance = match self.client.balance(from).await {
            Ok(value) => BalanceState::Loaded(value),
            Err(e) => BalanceState::Failed(e.detail()),
        };
        self.emit(BatchEvent::BalanceUpdated {
            table: RowTable::Transfers,
            index,
            balance,
        });
    }
}
