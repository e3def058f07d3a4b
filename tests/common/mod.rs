//! Shared utilities for integration testing.
//!
//! [`MockChain`] is an in-memory [`ChainClient`]: it records every
//! submitted transaction, answers ERC-20 reads from tables, and simulates
//! router swaps and unwraps so multi-step flows can be observed end to end.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, keccak256, Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;

use batchtx::batch::events::{self, EventReceiver};
use batchtx::batch::{AppState, BatchOrchestrator, BatchSettings, SwapRoute};
use batchtx::blockchain::contracts::{IERC20, ISwapRouter, IWETH9};
use batchtx::blockchain::{
    BlockchainError, BlockchainResult, ChainClient, ConfirmationStatus, FeeData, Wallet,
};

/// Anvil development keys.
pub const KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const KEY_1: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const KEY_2: &str = "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

pub const ADDR_0: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const ADDR_1: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const ADDR_2: Address = address!("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

pub const ROUTER: Address = address!("0x2626664c2603336E57B271c5C0b26F421741e481");
pub const WETH: Address = address!("0x4200000000000000000000000000000000000006");
pub const TOKEN: Address = address!("0x9999999999999999999999999999999999999999");

pub const DEST_A: &str = "0x1111111111111111111111111111111111111111";
pub const DEST_B: &str = "0x2222222222222222222222222222222222222222";

/// What a recorded transaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    Transfer,
    Approve,
    Swap,
    Unwrap,
    Other,
}

#[derive(Debug, Clone)]
pub struct SentTx {
    pub hash: TxHash,
    pub kind: TxKind,
    pub from: Address,
    pub to: Option<Address>,
    pub value: Option<U256>,
    pub input: Bytes,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
}

#[derive(Default)]
struct MockState {
    balances: HashMap<Address, U256>,
    token_balances: HashMap<(Address, Address), U256>,
    metadata: HashMap<Address, (String, String, u8)>,
    balance_errors: HashSet<Address>,
    send_errors: HashMap<Address, String>,
    revert_kinds: HashSet<TxKind>,
    estimate_error: Option<String>,
    fee_data: FeeData,
    gas_price: u128,
    swap_output: Option<U256>,
    sent: Vec<SentTx>,
    nonce: u64,
}

pub struct MockChain {
    state: Mutex<MockState>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                gas_price: 1_000_000_000,
                fee_data: FeeData {
                    max_fee_per_gas: Some(2_000_000_000),
                    max_priority_fee_per_gas: Some(1_000_000),
                },
                ..Default::default()
            }),
        }
    }

    pub fn with_balance(self, owner: Address, wei: u64) -> Self {
        self.state.lock().unwrap().balances.insert(owner, U256::from(wei));
        self
    }

    pub fn with_token_balance(self, token: Address, owner: Address, amount: U256) -> Self {
        self.state
            .lock()
            .unwrap()
            .token_balances
            .insert((token, owner), amount);
        self
    }

    pub fn with_metadata(self, token: Address, name: &str, symbol: &str, decimals: u8) -> Self {
        self.state
            .lock()
            .unwrap()
            .metadata
            .insert(token, (name.to_string(), symbol.to_string(), decimals));
        self
    }

    pub fn with_balance_error(self, owner: Address) -> Self {
        self.state.lock().unwrap().balance_errors.insert(owner);
        self
    }

    /// Reject every submission from `from` with `message`.
    pub fn with_send_error(self, from: Address, message: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .send_errors
            .insert(from, message.to_string());
        self
    }

    /// Mine transactions of `kind` with a failed receipt.
    pub fn with_revert(self, kind: TxKind) -> Self {
        self.state.lock().unwrap().revert_kinds.insert(kind);
        self
    }

    pub fn with_estimate_error(self, message: &str) -> Self {
        self.state.lock().unwrap().estimate_error = Some(message.to_string());
        self
    }

    /// Report no EIP-1559 support.
    pub fn legacy(self) -> Self {
        self.state.lock().unwrap().fee_data = FeeData::default();
        self
    }

    /// Wrapped native credited by a sell swap; defaults to the input amount.
    pub fn with_swap_output(self, amount: U256) -> Self {
        self.state.lock().unwrap().swap_output = Some(amount);
        self
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn sent_kinds(&self) -> Vec<TxKind> {
        self.sent().iter().map(|tx| tx.kind).collect()
    }

    pub fn token_balance(&self, token: Address, owner: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .token_balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }
}

fn target(tx: &TransactionRequest) -> Option<Address> {
    tx.to.as_ref().and_then(|kind| kind.to().copied())
}

fn calldata(tx: &TransactionRequest) -> Bytes {
    tx.input.input().cloned().unwrap_or_default()
}

fn kind_of(tx: &TransactionRequest) -> TxKind {
    let input = calldata(tx);
    if input.is_empty() {
        return TxKind::Transfer;
    }
    match <[u8; 4]>::try_from(&input[..4]) {
        Ok(selector) if selector == IERC20::approveCall::SELECTOR => TxKind::Approve,
        Ok(selector) if selector == ISwapRouter::exactInputSingleCall::SELECTOR => TxKind::Swap,
        Ok(selector) if selector == IWETH9::withdrawCall::SELECTOR => TxKind::Unwrap,
        _ => TxKind::Other,
    }
}

fn reverted() -> BlockchainError {
    BlockchainError::Rpc("execution reverted".to_string())
}

#[async_trait]
impl ChainClient for MockChain {
    async fn balance(&self, address: Address) -> BlockchainResult<U256> {
        let state = self.state.lock().unwrap();
        if state.balance_errors.contains(&address) {
            return Err(BlockchainError::Timeout(10));
        }
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> BlockchainResult<u64> {
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.estimate_error {
            return Err(BlockchainError::Rpc(message.clone()));
        }
        Ok(match kind_of(tx) {
            TxKind::Transfer => 21_000,
            TxKind::Swap => 180_000,
            _ => 46_000,
        })
    }

    async fn fee_data(&self) -> BlockchainResult<FeeData> {
        Ok(self.state.lock().unwrap().fee_data)
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        Ok(self.state.lock().unwrap().gas_price)
    }

    async fn call(&self, tx: &TransactionRequest) -> BlockchainResult<Bytes> {
        let state = self.state.lock().unwrap();
        let contract = target(tx).ok_or_else(reverted)?;
        let input = calldata(tx);
        if input.len() < 4 {
            return Err(reverted());
        }
        let selector = <[u8; 4]>::try_from(&input[..4]).map_err(|_| reverted())?;

        if selector == IERC20::balanceOfCall::SELECTOR {
            let call = IERC20::balanceOfCall::abi_decode(&input).map_err(|_| reverted())?;
            let amount = state
                .token_balances
                .get(&(contract, call.owner))
                .copied()
                .unwrap_or_default();
            return Ok((amount,).abi_encode_params().into());
        }

        let (name, symbol, decimals) = state.metadata.get(&contract).ok_or_else(reverted)?;
        if selector == IERC20::nameCall::SELECTOR {
            Ok((name.clone(),).abi_encode_params().into())
        } else if selector == IERC20::symbolCall::SELECTOR {
            Ok((symbol.clone(),).abi_encode_params().into())
        } else if selector == IERC20::decimalsCall::SELECTOR {
            Ok((U256::from(*decimals),).abi_encode_params().into())
        } else {
            Err(reverted())
        }
    }

    async fn send_transaction(
        &self,
        wallet: &Wallet,
        tx: TransactionRequest,
    ) -> BlockchainResult<TxHash> {
        let mut state = self.state.lock().unwrap();
        let from = wallet.address();
        if let Some(message) = state.send_errors.get(&from) {
            return Err(BlockchainError::Submission(message.clone()));
        }

        state.nonce += 1;
        let hash = keccak256(state.nonce.to_be_bytes());
        let kind = kind_of(&tx);
        let input = calldata(&tx);

        if !state.revert_kinds.contains(&kind) {
            match kind {
                TxKind::Swap => {
                    if let Ok(call) = ISwapRouter::exactInputSingleCall::abi_decode(&input) {
                        let params = call.params;
                        let spent = state
                            .token_balances
                            .entry((params.tokenIn, from))
                            .or_default();
                        *spent = spent.saturating_sub(params.amountIn);
                        let output = state.swap_output.unwrap_or(params.amountIn);
                        *state
                            .token_balances
                            .entry((params.tokenOut, params.recipient))
                            .or_default() += output;
                    }
                }
                TxKind::Unwrap => {
                    if let Some(to) = target(&tx) {
                        state.token_balances.insert((to, from), U256::ZERO);
                    }
                }
                _ => {}
            }
        }

        state.sent.push(SentTx {
            hash,
            kind,
            from,
            to: target(&tx),
            value: tx.value,
            input,
            gas_limit: tx.gas,
            gas_price: tx.gas_price,
            max_fee_per_gas: tx.max_fee_per_gas,
        });
        Ok(hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        let state = self.state.lock().unwrap();
        let sent = state
            .sent
            .iter()
            .find(|tx| tx.hash == tx_hash)
            .ok_or(BlockchainError::ConfirmationTimeout(tx_hash, 1))?;

        if state.revert_kinds.contains(&sent.kind) {
            return Ok(ConfirmationStatus::Failed("execution reverted".to_string()));
        }
        Ok(ConfirmationStatus::Confirmed { block_number: 1 })
    }
}

pub fn swap_route() -> SwapRoute {
    SwapRoute {
        router: ROUTER,
        wrapped_native: WETH,
        fee_tier: 10_000,
        amount_out_minimum: U256::ZERO,
        unlimited_approval: false,
    }
}

/// Orchestrator with no pauses, plus its event receiver.
pub fn orchestrator(chain: &Arc<MockChain>, swaps: bool) -> (BatchOrchestrator, EventReceiver) {
    let mut settings = BatchSettings::immediate("base");
    if swaps {
        settings = settings.with_swap_route(swap_route());
    }
    orchestrator_with(chain, settings)
}

pub fn orchestrator_with(
    chain: &Arc<MockChain>,
    settings: BatchSettings,
) -> (BatchOrchestrator, EventReceiver) {
    let (sender, receiver) = events::channel();
    let client: Arc<dyn ChainClient> = chain.clone();
    (BatchOrchestrator::new(client, settings, sender), receiver)
}

/// Apply every queued event to `state`.
pub fn drain(receiver: &mut EventReceiver, state: &mut AppState) {
    while let Ok(event) = receiver.try_recv() {
        state.apply(event);
    }
}

pub fn ether(amount: &str) -> U256 {
    alloy::primitives::utils::parse_ether(amount).unwrap()
}
