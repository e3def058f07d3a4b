//! Signing keys derived from user-supplied secrets.
//!
//! # Security
//! - Secrets come from rows files or flags and live only in memory
//! - Keys are never logged; `Debug` prints the address only
//! - Generated wallets are never submitted anywhere

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// A signing key with its derived address.
#[derive(Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix, surrounding
    ///   whitespace ignored)
    ///
    /// # Errors
    /// `BlockchainError::Wallet` when the secret is not a valid secp256k1 key.
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if key_hex.len() != 64 {
            return Err(BlockchainError::Wallet(format!(
                "Invalid private key length: expected 64 hex characters, got {}",
                key_hex.len()
            )));
        }

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self { signer })
    }

    /// Generate a fresh random wallet.
    pub fn generate() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The secret as a 0x-prefixed hex string, for export only.
    pub fn secret_hex(&self) -> String {
        format!("0x{}", alloy::hex::encode(self.signer.to_bytes()))
    }

    /// Network wallet used by alloy's signing filler.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_wallet_accepts_prefix_and_whitespace() {
        let wallet = Wallet::from_private_key(&format!("  0x{TEST_PRIVATE_KEY}\n")).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(Wallet::from_private_key("invalid").is_err());
        assert!(Wallet::from_private_key("").is_err());
        let not_hex = "zz".repeat(32);
        assert!(Wallet::from_private_key(&not_hex).is_err());
        // Zero is not a valid secp256k1 scalar
        assert!(Wallet::from_private_key(&"0".repeat(64)).is_err());
    }

    #[test]
    fn test_secret_round_trip() {
        let wallet = Wallet::generate();
        let secret = wallet.secret_hex();
        assert_eq!(secret.len(), 66);

        let restored = Wallet::from_private_key(&secret).unwrap();
        assert_eq!(restored.address(), wallet.address());
    }

    #[test]
    fn test_debug_hides_secret() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(!debug.contains(TEST_PRIVATE_KEY));
        assert!(debug.contains("address"));
    }
}
