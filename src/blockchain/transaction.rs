//! Gas and fee resolution for outgoing transactions.
//!
//! # Responsibilities
//! - Estimate the gas limit, falling back to a fixed limit when the node
//!   refuses to estimate
//! - Prefer EIP-1559 fee fields, fall back to a legacy gas price
//! - Stamp the chosen settings onto a `TransactionRequest`

use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{BlockchainResult, GasPricing, GasSettings};

/// Resolve gas limit and fee fields for `tx`.
///
/// Estimation and the fee lookup form one step: if either fails the limit
/// becomes `fallback_gas_limit` and the price a legacy `eth_gasPrice`. Only
/// a failure of that fallback lookup is returned as an error.
pub async fn resolve_gas(
    client: &dyn ChainClient,
    tx: &TransactionRequest,
    fallback_gas_limit: u64,
) -> BlockchainResult<GasSettings> {
    let estimated = async {
        let gas_limit = client.estimate_gas(tx).await?;
        let fees = client.fee_data().await?;

        let pricing = match fees.eip1559() {
            Some((max_fee_per_gas, max_priority_fee_per_gas)) => GasPricing::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            },
            None => GasPricing::Legacy {
                gas_price: client.gas_price().await?,
            },
        };

        BlockchainResult::Ok(GasSettings {
            gas_limit,
            pricing,
            fallback: false,
        })
    }
    .await;

    match estimated {
        Ok(settings) => {
            tracing::debug!(
                gas_limit = settings.gas_limit,
                eip1559 = matches!(settings.pricing, GasPricing::Eip1559 { .. }),
                "Gas resolved"
            );
            Ok(settings)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                fallback_gas_limit,
                "Gas estimation failed, using defaults"
            );
            let gas_price = client.gas_price().await?;
            Ok(GasSettings {
                gas_limit: fallback_gas_limit,
                pricing: GasPricing::Legacy { gas_price },
                fallback: true,
            })
        }
    }
}

/// Apply resolved gas settings to a transaction request.
pub fn apply_gas(tx: TransactionRequest, settings: &GasSettings) -> TransactionRequest {
    let tx = tx.with_gas_limit(settings.gas_limit);
    match settings.pricing {
        GasPricing::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => tx
            .with_max_fee_per_gas(max_fee_per_gas)
            .with_max_priority_fee_per_gas(max_priority_fee_per_gas),
        GasPricing::Legacy { gas_price } => tx.with_gas_price(gas_price),
    }
}
