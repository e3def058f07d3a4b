//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Define the [`ChainClient`] seam the batch orchestrator depends on
//! - Connect to the selected network's JSON-RPC endpoint
//! - Query chain state (balances, gas, fee data, receipts)
//! - Sign and broadcast transactions for a given wallet
//! - Handle timeouts and network errors gracefully

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use tokio::time::{interval, timeout};

use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainId, ConfirmationStatus, FeeData,
};
use crate::blockchain::wallet::Wallet;
use crate::config::{NetworkConfig, RpcConfig};

/// Remote chain capabilities used by batchtx.
///
/// Production code uses [`RpcClient`]; tests substitute an in-memory chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native balance of an address in wei.
    async fn balance(&self, address: Address) -> BlockchainResult<U256>;

    /// Gas limit estimate for a transaction.
    async fn estimate_gas(&self, tx: &TransactionRequest) -> BlockchainResult<u64>;

    /// EIP-1559 fee data, empty on legacy chains.
    async fn fee_data(&self) -> BlockchainResult<FeeData>;

    /// Legacy gas price in wei.
    async fn gas_price(&self) -> BlockchainResult<u128>;

    /// Read-only `eth_call`.
    async fn call(&self, tx: &TransactionRequest) -> BlockchainResult<Bytes>;

    /// Sign `tx` with `wallet` and broadcast it. Nonce and chain ID are
    /// filled by the client.
    async fn send_transaction(
        &self,
        wallet: &Wallet,
        tx: TransactionRequest,
    ) -> BlockchainResult<TxHash>;

    /// Wait until `tx_hash` is mined.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus>;
}

/// JSON-RPC client for one network.
#[derive(Clone)]
pub struct RpcClient {
    provider: Arc<dyn Provider + Send + Sync>,
    rpc_url: url::Url,
    network: NetworkConfig,
    timeout_duration: Duration,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl RpcClient {
    /// Create a new client for `network`.
    ///
    /// # Errors
    /// `BlockchainError::InvalidRpcUrl` when the endpoint does not parse. No
    /// request is made here; an unreachable node surfaces on the first call.
    pub fn new(network: NetworkConfig, rpc: &RpcConfig) -> BlockchainResult<Self> {
        let rpc_url: url::Url = network.rpc_url.parse().map_err(|e| {
            BlockchainError::InvalidRpcUrl(format!("'{}': {}", network.rpc_url, e))
        })?;

        let provider = Arc::new(ProviderBuilder::new().connect_http(rpc_url.clone()))
            as Arc<dyn Provider + Send + Sync>;

        tracing::info!(
            rpc_url = %rpc_url,
            chain_id = network.chain_id,
            "Blockchain client initialized"
        );

        Ok(Self {
            provider,
            rpc_url,
            network,
            timeout_duration: Duration::from_secs(rpc.timeout_secs),
            confirmation_timeout: Duration::from_secs(rpc.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(rpc.confirmation_poll_ms),
        })
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.network.chain_id {
            return Err(BlockchainError::Rpc(format!(
                "Chain ID mismatch: expected {}, got {}",
                self.network.chain_id, chain_id.0
            )));
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.timed(self.provider.get_chain_id()).await.map(ChainId)
    }

    /// The network this client is connected to.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    async fn timed<T, F>(&self, fut: F) -> BlockchainResult<T>
    where
        F: Future<Output = TransportResult<T>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(BlockchainError::Rpc(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration.as_secs())),
        }
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn balance(&self, address: Address) -> BlockchainResult<U256> {
        self.timed(self.provider.get_balance(address).into_future())
            .await
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> BlockchainResult<u64> {
        self.timed(self.provider.estimate_gas(tx.clone()).into_future())
            .await
    }

    async fn fee_data(&self) -> BlockchainResult<FeeData> {
        match timeout(self.timeout_duration, self.provider.estimate_eip1559_fees()).await {
            Ok(Ok(estimate)) => Ok(FeeData {
                max_fee_per_gas: Some(estimate.max_fee_per_gas),
                max_priority_fee_per_gas: Some(estimate.max_priority_fee_per_gas),
            }),
            Ok(Err(e)) => {
                // Pre-London chains have no base fee; callers fall back to gas price.
                tracing::debug!(error = %e, "EIP-1559 fee estimation unavailable");
                Ok(FeeData::default())
            }
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.timed(self.provider.get_gas_price()).await
    }

    async fn call(&self, tx: &TransactionRequest) -> BlockchainResult<Bytes> {
        self.timed(self.provider.call(tx.clone()).into_future())
            .await
    }

    async fn send_transaction(
        &self,
        wallet: &Wallet,
        tx: TransactionRequest,
    ) -> BlockchainResult<TxHash> {
        let signing_provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(self.rpc_url.clone());

        match timeout(self.timeout_duration, signing_provider.send_transaction(tx)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(BlockchainError::Submission(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        let result = timeout(self.confirmation_timeout, async {
            let mut ticker = interval(self.poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self
                    .timed(self.provider.get_transaction_receipt(tx_hash))
                    .await?
                {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Ok(ConfirmationStatus::Failed(
                        "execution reverted".to_string(),
                    ));
                }

                return Ok(ConfirmationStatus::Confirmed {
                    block_number: receipt.block_number.unwrap_or_default(),
                });
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(
                tx_hash,
                self.confirmation_timeout.as_secs(),
            )),
        }
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("rpc_url", &self.network.rpc_url)
            .field("chain_id", &self.network.chain_id)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
