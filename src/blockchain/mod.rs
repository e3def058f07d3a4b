//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Row secrets (rows file / flags)
//!     → wallet.rs (key parsing, address derivation)
//!     → contracts.rs (router / ERC-20 / WETH calldata)
//!     → transaction.rs (gas + fee resolution)
//!     → client.rs (RPC with timeouts, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Every remote capability sits behind the `ChainClient` trait

pub mod client;
pub mod contracts;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{ChainClient, RpcClient};
pub use types::{BlockchainError, BlockchainResult, ConfirmationStatus, FeeData, GasPricing, GasSettings};
pub use wallet::Wallet;
