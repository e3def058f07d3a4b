//! Sequential batch execution.
//!
//! # Responsibilities
//! - Run one job at a time, in row order, with a fixed pause between rows
//! - Drive each row through its status lifecycle via [`BatchEvent`]s
//! - Keep going after a row fails; a failure is recorded on that row only
//! - Produce a [`BatchSummary`] and record batch metrics
//!
//! Operation-specific steps live in `transfer.rs`, `swap.rs` and `loader.rs`.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use tracing::Instrument;
use uuid::Uuid;

use crate::batch::classify::{classify_failure, Operation};
use crate::batch::eligibility::InputError;
use crate::batch::events::{BatchEvent, BatchSummary, EventSender, RowTable};
use crate::batch::rows::RowStatus;
use crate::blockchain::transaction::{apply_gas, resolve_gas};
use crate::blockchain::{BlockchainError, BlockchainResult, ChainClient, ConfirmationStatus, Wallet};
use crate::config::{AppConfig, GasConfig, NetworkConfig};
use crate::observability::metrics;

/// Router and wrapped-native addresses for swaps on one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRoute {
    pub router: Address,
    pub wrapped_native: Address,
    pub fee_tier: u32,
    pub amount_out_minimum: U256,
    pub unlimited_approval: bool,
}

/// Everything the orchestrator needs from configuration.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub network: String,
    pub transfer_delay: Duration,
    pub load_delay: Duration,
    pub token_refresh_delay: Duration,
    pub gas: GasConfig,
    /// `None` on networks without a configured router.
    pub swap: Option<SwapRoute>,
}

impl BatchSettings {
    pub fn from_config(config: &AppConfig, network_name: &str, network: &NetworkConfig) -> Self {
        let swap = match (&network.router_address, &network.wrapped_native_address) {
            (Some(router), Some(wrapped)) => match (router.parse(), wrapped.parse()) {
                (Ok(router), Ok(wrapped_native)) => Some(SwapRoute {
                    router,
                    wrapped_native,
                    fee_tier: config.swap.fee_tier,
                    amount_out_minimum: U256::ZERO,
                    unlimited_approval: config.swap.unlimited_approval,
                }),
                _ => None,
            },
            _ => None,
        };

        Self {
            network: network_name.to_string(),
            transfer_delay: Duration::from_millis(config.batch.transfer_delay_ms),
            load_delay: Duration::from_millis(config.batch.load_delay_ms),
            token_refresh_delay: Duration::from_millis(config.batch.token_refresh_delay_ms),
            gas: config.gas.clone(),
            swap,
        }
    }

    /// Settings with no pauses and no swap route.
    pub fn immediate(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            transfer_delay: Duration::ZERO,
            load_delay: Duration::ZERO,
            token_refresh_delay: Duration::ZERO,
            gas: GasConfig::default(),
            swap: None,
        }
    }

    pub fn with_swap_route(mut self, route: SwapRoute) -> Self {
        self.swap = Some(route);
        self
    }

    /// Minimum router output in raw token units; zero accepts any price.
    pub fn with_amount_out_minimum(mut self, minimum: U256) -> Self {
        if let Some(route) = self.swap.as_mut() {
            route.amount_out_minimum = minimum;
        }
        self
    }

    pub fn route(&self) -> Result<&SwapRoute, InputError> {
        self.swap
            .as_ref()
            .ok_or_else(|| InputError::SwapsUnsupported(self.network.clone()))
    }
}

pub struct BatchOrchestrator {
    pub(crate) client: Arc<dyn ChainClient>,
    pub(crate) settings: BatchSettings,
    events: EventSender,
}

impl BatchOrchestrator {
    pub fn new(client: Arc<dyn ChainClient>, settings: BatchSettings, events: EventSender) -> Self {
        Self {
            client,
            settings,
            events,
        }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    pub(crate) fn emit(&self, event: BatchEvent) {
        // A closed receiver does not stop the batch.
        let _ = self.events.send(event);
    }

    pub(crate) fn set_status(&self, table: RowTable, index: usize, status: RowStatus) {
        self.emit(BatchEvent::RowStatus {
            table,
            index,
            status,
        });
    }

    /// Record a classified failure on one row and return its message.
    pub(crate) fn fail(
        &self,
        table: RowTable,
        index: usize,
        operation: Operation,
        error: &BlockchainError,
    ) -> String {
        let message = classify_failure(operation, error);
        tracing::warn!(row = index, error = %error, "Row failed");
        self.set_status(table, index, RowStatus::Error(message.clone()));
        message
    }

    pub(crate) fn reject(&self, table: RowTable, rejected: &[(usize, RowStatus)]) {
        for (index, status) in rejected {
            tracing::warn!(row = index, status = %status, "Row rejected");
            self.set_status(table, *index, status.clone());
        }
    }

    /// Resolve gas, sign and broadcast.
    pub(crate) async fn submit(
        &self,
        wallet: &Wallet,
        tx: TransactionRequest,
        fallback_gas_limit: u64,
    ) -> BlockchainResult<TxHash> {
        let gas = resolve_gas(self.client.as_ref(), &tx, fallback_gas_limit).await?;
        let tx = apply_gas(tx, &gas);
        let tx_hash = self.client.send_transaction(wallet, tx).await?;
        tracing::info!(
            tx_hash = %tx_hash,
            from = %wallet.address(),
            gas_limit = gas.gas_limit,
            "Transaction submitted"
        );
        Ok(tx_hash)
    }

    /// Wait for `tx_hash`; a failed receipt becomes `Reverted`.
    pub(crate) async fn confirm(&self, tx_hash: TxHash) -> BlockchainResult<u64> {
        match self.client.wait_for_confirmation(tx_hash).await? {
            ConfirmationStatus::Confirmed { block_number } => {
                tracing::info!(tx_hash = %tx_hash, block_number, "Transaction confirmed");
                Ok(block_number)
            }
            ConfirmationStatus::Failed(reason) => Err(BlockchainError::Reverted(reason)),
        }
    }

    /// Submit, publish the pending status, then wait for the receipt.
    pub(crate) async fn execute(
        &self,
        table: RowTable,
        index: usize,
        wallet: &Wallet,
        tx: TransactionRequest,
        fallback_gas_limit: u64,
        pending: fn(TxHash) -> RowStatus,
    ) -> BlockchainResult<TxHash> {
        let tx_hash = self.submit(wallet, tx, fallback_gas_limit).await?;
        self.set_status(table, index, pending(tx_hash));
        self.confirm(tx_hash).await?;
        Ok(tx_hash)
    }

    /// Run `step` over `jobs` in order with `delay` between rows.
    pub(crate) async fn run_pass<J, F, Fut>(
        &self,
        operation: Operation,
        jobs: Vec<J>,
        delay: Duration,
        mut step: F,
    ) -> BatchSummary
    where
        F: FnMut(J) -> Fut,
        Fut: Future<Output = bool>,
    {
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("batch", %batch_id, %operation);

        async move {
            let started = Instant::now();
            let total = jobs.len();
            tracing::info!(rows = total, network = %self.settings.network, "Batch started");

            let mut succeeded = 0;
            for (position, job) in jobs.into_iter().enumerate() {
                if position > 0 && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }

                let ok = step(job).await;
                metrics::record_row_outcome(operation, ok);
                if ok {
                    succeeded += 1;
                }
                self.emit(BatchEvent::Progress {
                    completed: position + 1,
                    total,
                });
            }

            let summary = BatchSummary {
                batch_id,
                operation,
                attempted: total,
                succeeded,
            };
            metrics::record_batch_duration(operation, started.elapsed());
            tracing::info!(
                attempted = summary.attempted,
                succeeded = summary.succeeded,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Batch completed"
            );
            self.emit(BatchEvent::Completed(summary.clone()));
            summary
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = AppConfig::default();
        let network = config.network("base").unwrap();
        let settings = BatchSettings::from_config(&config, "base", network);

        assert_eq!(settings.transfer_delay, Duration::from_millis(1000));
        assert_eq!(settings.load_delay, Duration::from_millis(500));
        assert_eq!(settings.token_refresh_delay, Duration::from_millis(300));
        let route = settings.route().unwrap();
        assert_eq!(route.fee_tier, 10_000);
        assert!(route.amount_out_minimum.is_zero());
        assert!(!route.unlimited_approval);
    }

    #[test]
    fn test_no_route_without_router() {
        let config = AppConfig::default();
        let network = config.network("sepolia").unwrap();
        let settings = BatchSettings::from_config(&config, "sepolia", network);

        assert_eq!(
            settings.route().unwrap_err(),
            InputError::SwapsUnsupported("sepolia".into())
        );
    }

    #[test]
    fn test_amount_out_minimum_override() {
        let config = AppConfig::default();
        let network = config.network("mainnet").unwrap();
        let settings = BatchSettings::from_config(&config, "mainnet", network)
            .with_amount_out_minimum(U256::from(42u64));

        assert_eq!(settings.route().unwrap().amount_out_minimum, U256::from(42u64));
    }
}
