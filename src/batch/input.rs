//! Rows file loading.
//!
//! ```toml
//! # Shared secret for single-key transfers (optional).
//! secret = "0x..."
//!
//! [[transfers]]
//! destination = "0x..."
//! amount = "0.01"
//! secret = "0x..."   # multi-key mode only
//!
//! [[swaps]]
//! secret = "0x..."
//! amount = "0.05"    # native amount spent by a buy
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::batch::rows::{SwapRow, TransferRow};

#[derive(Debug, Error)]
pub enum RowsFileError {
    #[error("Failed to read rows file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse rows file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RowsFile {
    pub secret: Option<String>,
    pub transfers: Vec<TransferRow>,
    pub swaps: Vec<SwapRow>,
}

impl RowsFile {
    pub fn parse(content: &str) -> Result<Self, RowsFileError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, RowsFileError> {
        let content = std::fs::read_to_string(path)?;
        let rows = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            transfers = rows.transfers.len(),
            swaps = rows.swaps.len(),
            "Rows file loaded"
        );
        Ok(rows)
    }
}
