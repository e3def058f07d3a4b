//! Events emitted by the orchestrator while a batch runs.
//!
//! The orchestrator never touches application state directly. It pushes
//! [`BatchEvent`]s into an unbounded channel and the owner of
//! [`AppState`](crate::batch::state::AppState) applies them in order.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::batch::classify::Operation;
use crate::batch::rows::{BalanceState, RowStatus};

pub type EventSender = mpsc::UnboundedSender<BatchEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<BatchEvent>;

/// Create the event channel for one orchestrator.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Which row table an event addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTable {
    Transfers,
    Swaps,
}

/// Outcome of one submitted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub index: usize,
    pub from: Address,
    pub to: Address,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferRecord {
    pub fn succeeded(&self) -> bool {
        self.hash.is_some() && self.error.is_none()
    }
}

/// Totals for a finished pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub operation: Operation,
    pub attempted: usize,
    pub succeeded: usize,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}/{} succeeded",
            self.operation, self.succeeded, self.attempted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    RowStatus {
        table: RowTable,
        index: usize,
        status: RowStatus,
    },
    AddressDerived {
        table: RowTable,
        index: usize,
        address: Address,
    },
    BalanceUpdated {
        table: RowTable,
        index: usize,
        balance: BalanceState,
    },
    TokenBalanceUpdated {
        index: usize,
        balance: BalanceState,
    },
    Recorded(TransferRecord),
    Progress {
        completed: usize,
        total: usize,
    },
    Completed(BatchSummary),
}
