//! Fresh wallet generation and export.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use alloy::primitives::Address;
use serde::Serialize;
use thiserror::Error;

use crate::batch::eligibility::InputError;
use crate::blockchain::Wallet;

pub const EXPORT_HEADER: &str = "Wallet Address,Private Key";
pub const DEFAULT_EXPORT_FILE: &str = "generated_wallets.txt";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Address and hex secret of a generated key pair.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedWallet {
    pub address: Address,
    pub secret: String,
}

impl std::fmt::Debug for GeneratedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedWallet")
            .field("address", &self.address)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Generate `count` random wallets; `count` must be in `1..=max`.
pub fn generate_wallets(count: usize, max: usize) -> Result<Vec<GeneratedWallet>, InputError> {
    if count == 0 || count > max {
        return Err(InputError::InvalidWalletCount {
            requested: count,
            max,
        });
    }

    let wallets = (0..count)
        .map(|_| {
            let wallet = Wallet::generate();
            GeneratedWallet {
                address: wallet.address(),
                secret: wallet.secret_hex(),
            }
        })
        .collect();

    tracing::info!(count, "Generated wallets");
    Ok(wallets)
}

/// Header line plus one `address,secret` line per wallet.
pub fn export_csv(wallets: &[GeneratedWallet]) -> Result<String, InputError> {
    if wallets.is_empty() {
        return Err(InputError::NothingToExport);
    }

    let mut out = String::from(EXPORT_HEADER);
    out.push('\n');
    for wallet in wallets {
        out.push_str(&format!("{},{}\n", wallet.address, wallet.secret));
    }
    Ok(out)
}

/// In-process copy buffer.
#[derive(Debug, Default)]
pub struct Clipboard {
    contents: Option<String>,
}

impl Clipboard {
    pub fn set(&mut self, text: String) {
        self.contents = Some(text);
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    pub fn clear(&mut self) {
        self.contents = None;
    }
}

pub enum ExportTarget<'a> {
    File(&'a Path),
    Clipboard(&'a mut Clipboard),
}

/// Write the export to `target`. Returns the number of wallets written.
pub fn export(wallets: &[GeneratedWallet], target: ExportTarget<'_>) -> Result<usize, ExportError> {
    let text = export_csv(wallets)?;

    match target {
        ExportTarget::File(path) => {
            let mut options = OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(path)?;
            file.write_all(text.as_bytes())?;
            tracing::info!(path = %path.display(), count = wallets.len(), "Wallets exported");
        }
        ExportTarget::Clipboard(clipboard) => {
            clipboard.set(text);
            tracing::info!(count = wallets.len(), "Wallets copied");
        }
    }

    Ok(wallets.len())
}
