//! Key loading, balance refresh and token validation.

use std::sync::Arc;

use alloy::primitives::U256;

use batchtx::batch::loader::{swap_addresses, swap_secrets, transfer_secrets};
use batchtx::batch::{AppState, BalanceState, InputError, Operation, RowStatus, RowTable, SwapRow, TransferRow};
use batchtx::token::{validate_token, DEFAULT_DECIMALS, UNKNOWN_NAME, UNKNOWN_SYMBOL};

mod common;
use common::*;

fn keyed(secret: &str) -> TransferRow {
    TransferRow {
        secret: secret.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_load_wallets_derives_addresses_and_balances() {
    let chain = Arc::new(
        MockChain::new()
            .with_balance(ADDR_0, 10u64.pow(18))
            .with_balance_error(ADDR_1),
    );
    let (orchestrator, mut events) = orchestrator(&chain, false);
    let mut state = AppState::new("base", 30);
    state
        .set_transfer_rows(vec![keyed(KEY_0), keyed("0x1234"), keyed(KEY_1), keyed("")])
        .unwrap();

    let summary = orchestrator
        .load_wallets(RowTable::Transfers, transfer_secrets(&state.transfers))
        .await;
    drain(&mut events, &mut state);

    assert_eq!(summary.operation, Operation::Load);
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 1);

    assert_eq!(state.transfers[0].source_address, Some(ADDR_0));
    assert_eq!(
        state.transfers[0].balance,
        BalanceState::Loaded(U256::from(10u64.pow(18)))
    );
    assert_eq!(state.transfers[0].balance.to_string(), "1.000000000000000000");

    assert_eq!(state.transfers[1].status, RowStatus::InvalidKey);
    assert_eq!(state.transfers[1].source_address, None);

    assert_eq!(state.transfers[2].source_address, Some(ADDR_1));
    assert!(matches!(state.transfers[2].balance, BalanceState::Failed(_)));
    assert_eq!(state.transfers[2].balance.to_string(), "Error");

    assert_eq!(state.transfers[3].source_address, None);
    assert!(chain.sent().is_empty());
}

#[tokio::test]
async fn test_refresh_token_balances_after_load() {
    let chain = Arc::new(
        MockChain::new()
            .with_token_balance(TOKEN, ADDR_0, U256::from(5u64))
            .with_token_balance(TOKEN, ADDR_2, U256::from(9u64)),
    );
    let (orchestrator, mut events) = orchestrator(&chain, false);
    let mut state = AppState::new("base", 30);
    state
        .set_swap_rows(vec![
            SwapRow {
                secret: KEY_0.into(),
                ..Default::default()
            },
            SwapRow::default(),
            SwapRow {
                secret: KEY_2.into(),
                ..Default::default()
            },
        ])
        .unwrap();

    orchestrator
        .load_wallets(RowTable::Swaps, swap_secrets(&state.swaps))
        .await;
    drain(&mut events, &mut state);
    assert_eq!(swap_addresses(&state.swaps), vec![(0, ADDR_0), (2, ADDR_2)]);

    let summary = orchestrator
        .refresh_token_balances(TOKEN, swap_addresses(&state.swaps))
        .await;
    drain(&mut events, &mut state);

    assert_eq!(summary.operation, Operation::TokenRefresh);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(state.swaps[0].token_balance, BalanceState::Loaded(U256::from(5u64)));
    assert_eq!(state.swaps[1].token_balance, BalanceState::Unknown);
    assert_eq!(state.swaps[2].token_balance, BalanceState::Loaded(U256::from(9u64)));
}

#[tokio::test]
async fn test_validate_token_reads_metadata_once() {
    let chain = MockChain::new().with_metadata(TOKEN, "Degen Coin", "DEGEN", 18);
    let mut state = AppState::new("base", 1);
    let address = TOKEN.to_string();

    let first = validate_token(&chain, &mut state.tokens, &address).await.unwrap();
    assert_eq!(first.name, "Degen Coin");
    assert_eq!(first.symbol, "DEGEN");
    assert_eq!(first.decimals, 18);
    assert_eq!(state.tokens.len(), 1);

    let second = validate_token(&chain, &mut state.tokens, &address).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(state.tokens.len(), 1);

    state.select_network("mainnet");
    assert!(state.tokens.is_empty());
}

#[tokio::test]
async fn test_validate_token_placeholders() {
    let chain = MockChain::new();
    let mut state = AppState::new("base", 1);

    let token = validate_token(&chain, &mut state.tokens, &WETH.to_string())
        .await
        .unwrap();
    assert_eq!(token.name, UNKNOWN_NAME);
    assert_eq!(token.symbol, UNKNOWN_SYMBOL);
    assert_eq!(token.decimals, DEFAULT_DECIMALS);
}

#[tokio::test]
async fn test_validate_token_rejects_bad_address() {
    let chain = MockChain::new();
    let mut state = AppState::new("base", 1);

    let err = validate_token(&chain, &mut state.tokens, "0xZZZZ")
        .await
        .unwrap_err();
    assert_eq!(err, InputError::InvalidAddress("0xZZZZ".into()));
    assert!(state.tokens.is_empty());
}
