//! Failure classification into short per-row messages.

use serde::Serialize;

use crate::blockchain::BlockchainError;

/// Maximum length of an unclassified failure message before truncation.
pub const MAX_ERROR_LEN: usize = 50;

/// Kind of batch pass; selects the failure wording and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Transfer,
    Buy,
    Sell,
    Approve,
    Load,
    TokenRefresh,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Transfer => "transfer",
            Operation::Buy => "buy",
            Operation::Sell => "sell",
            Operation::Approve => "approve",
            Operation::Load => "load",
            Operation::TokenRefresh => "token_refresh",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a failure to the message stored in the row.
///
/// Insufficient funds, user rejection and reverts get fixed wording; any
/// other message is passed through, cut at [`MAX_ERROR_LEN`] characters.
pub fn classify_failure(operation: Operation, error: &BlockchainError) -> String {
    let raw = error.to_string().to_lowercase();

    if raw.contains("insufficient funds") {
        return match operation {
            Operation::Buy => "Insufficient ETH in wallet",
            Operation::Sell => "Insufficient tokens to sell",
            Operation::Approve => "Insufficient ETH for approval gas",
            _ => "Insufficient funds for transfer",
        }
        .to_string();
    }

    if raw.contains("user rejected") {
        return match operation {
            Operation::Approve => "Approval rejected by user",
            _ => "Transaction rejected by user",
        }
        .to_string();
    }

    if raw.contains("execution reverted") {
        return match operation {
            Operation::Buy => "Transaction reverted - liquidity or token restrictions",
            Operation::Sell => "Sell reverted - liquidity or token restrictions",
            Operation::Approve => "Approval reverted",
            _ => "Transaction reverted",
        }
        .to_string();
    }

    truncate_message(&error.detail(), MAX_ERROR_LEN)
}

/// Cut `message` to `limit` characters, appending `...` when shortened.
pub fn truncate_message(message: &str, limit: usize) -> String {
    if message.chars().count() <= limit {
        return message.to_string();
    }
    let mut cut: String = message.chars().take(limit).collect();
    cut.push_str("...");
    cut
}
