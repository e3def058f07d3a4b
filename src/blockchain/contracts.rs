//! ABI bindings and calldata builders for the contracts batchtx talks to.
//!
//! Calls are encoded here and sent through [`ChainClient`](super::ChainClient)
//! so that every contract interaction goes through the same injectable seam.

use alloy::network::TransactionBuilder;
use alloy::primitives::aliases::{U160, U24};
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

sol! {
    /// Minimal ERC-20 surface.
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// Wrapped native asset (WETH9).
    interface IWETH9 {
        function deposit() external payable;
        function withdraw(uint256 wad) external;
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// Uniswap V3 style router, single-hop exact-input entry point.
    interface ISwapRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
    }
}

/// Parameters for one router swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapCall {
    pub router: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub fee_tier: u32,
    pub recipient: Address,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    /// Native value attached to the call (buys pay with native balance).
    pub value: U256,
}

impl SwapCall {
    /// Build the router transaction. The price limit is always zero.
    pub fn into_request(self, from: Address) -> TransactionRequest {
        let call = ISwapRouter::exactInputSingleCall {
            params: ISwapRouter::ExactInputSingleParams {
                tokenIn: self.token_in,
                tokenOut: self.token_out,
                fee: U24::from(self.fee_tier),
                recipient: self.recipient,
                amountIn: self.amount_in,
                amountOutMinimum: self.amount_out_minimum,
                sqrtPriceLimitX96: U160::ZERO,
            },
        };

        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_to(self.router)
            .with_input(Bytes::from(call.abi_encode()));
        if !self.value.is_zero() {
            tx = tx.with_value(self.value);
        }
        tx
    }
}

/// `approve(spender, amount)` on an ERC-20.
pub fn approve_request(
    from: Address,
    token: Address,
    spender: Address,
    amount: U256,
) -> TransactionRequest {
    let call = IERC20::approveCall { spender, amount };
    TransactionRequest::default()
        .with_from(from)
        .with_to(token)
        .with_input(Bytes::from(call.abi_encode()))
}

/// `withdraw(wad)` on the wrapped native asset.
pub fn unwrap_request(from: Address, wrapped_native: Address, amount: U256) -> TransactionRequest {
    let call = IWETH9::withdrawCall { wad: amount };
    TransactionRequest::default()
        .with_from(from)
        .with_to(wrapped_native)
        .with_input(Bytes::from(call.abi_encode()))
}

/// Plain native value transfer.
pub fn transfer_request(from: Address, to: Address, value: U256) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(from)
        .with_to(to)
        .with_value(value)
}

fn view_request<C: SolCall>(contract: Address, call: &C) -> TransactionRequest {
    TransactionRequest::default()
        .with_to(contract)
        .with_input(Bytes::from(call.abi_encode()))
}

/// Read-only ERC-20 calls through a [`ChainClient`].
pub struct Erc20<'a> {
    client: &'a dyn ChainClient,
    address: Address,
}

impl<'a> Erc20<'a> {
    pub fn new(client: &'a dyn ChainClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Get the token name.
    pub async fn name(&self) -> BlockchainResult<String> {
        let data = self
            .client
            .call(&view_request(self.address, &IERC20::nameCall {}))
            .await?;
        IERC20::nameCall::abi_decode_returns(&data)
            .map_err(|e| BlockchainError::Contract(format!("name(): {}", e)))
    }

    /// Get the token symbol.
    pub async fn symbol(&self) -> BlockchainResult<String> {
        let data = self
            .client
            .call(&view_request(self.address, &IERC20::symbolCall {}))
            .await?;
        IERC20::symbolCall::abi_decode_returns(&data)
            .map_err(|e| BlockchainError::Contract(format!("symbol(): {}", e)))
    }

    /// Get the token decimals.
    pub async fn decimals(&self) -> BlockchainResult<u8> {
        let data = self
            .client
            .call(&view_request(self.address, &IERC20::decimalsCall {}))
            .await?;
        IERC20::decimalsCall::abi_decode_returns(&data)
            .map_err(|e| BlockchainError::Contract(format!("decimals(): {}", e)))
    }

    /// Get the balance of an address in the token's smallest unit.
    pub async fn balance_of(&self, owner: Address) -> BlockchainResult<U256> {
        let data = self
            .client
            .call(&view_request(self.address, &IERC20::balanceOfCall { owner }))
            .await?;
        IERC20::balanceOfCall::abi_decode_returns(&data)
            .map_err(|e| BlockchainError::Contract(format!("balanceOf(): {}", e)))
    }
}
