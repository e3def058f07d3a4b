//! Batch transaction orchestration for EVM networks.
//!
//! Sequential native transfers (one key or one key per row), wallet
//! generation, and token buys/sells through a Uniswap V3 style router,
//! with per-row status tracking.

pub mod batch;
pub mod blockchain;
pub mod config;
pub mod observability;
pub mod token;
pub mod wallets;

pub use batch::{AppState, BatchOrchestrator, BatchSettings};
pub use config::AppConfig;
