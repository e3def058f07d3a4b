//! Batch orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! Rows file / AppState rows
//!     → eligibility.rs (validation, job selection)
//!     → orchestrator.rs (sequential pass, delays, summary)
//!         → transfer.rs | swap.rs | loader.rs (per-row steps)
//!     → events.rs (status / balance / progress events)
//!     → state.rs (AppState applies events in order)
//! ```
//!
//! Rows are processed strictly one after another. A row failure is recorded
//! on that row and the pass moves on.

pub mod classify;
pub mod eligibility;
pub mod events;
pub mod input;
pub mod loader;
pub mod orchestrator;
pub mod rows;
pub mod state;
pub mod swap;
pub mod transfer;

pub use classify::{classify_failure, Operation};
pub use eligibility::{InputError, Selection, SwapJob, TransferJob};
pub use events::{BatchEvent, BatchSummary, RowTable, TransferRecord};
pub use orchestrator::{BatchOrchestrator, BatchSettings, SwapRoute};
pub use rows::{BalanceState, RowStatus, SwapRow, TransferRow};
pub use state::AppState;
