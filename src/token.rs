//! Token metadata lookup and caching.
//!
//! A token address is validated by format only. Metadata reads are best
//! effort: each failed read falls back to a placeholder so a token with a
//! broken `name()` can still be traded.

use std::collections::HashMap;

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::batch::classify::truncate_message;
use crate::batch::eligibility::{parse_address, InputError};
use crate::blockchain::contracts::Erc20;
use crate::blockchain::ChainClient;

pub const UNKNOWN_NAME: &str = "Unknown Token";
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";
pub const DEFAULT_DECIMALS: u8 = 18;

/// Longest name or symbol shown before truncation.
pub const DISPLAY_LIMIT: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDescriptor {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn display_name(&self) -> String {
        truncate_message(&self.name, DISPLAY_LIMIT)
    }

    pub fn display_symbol(&self) -> String {
        truncate_message(&self.symbol, DISPLAY_LIMIT)
    }

    /// Render a raw balance in whole-token units.
    pub fn format_amount(&self, raw: U256) -> String {
        format_units(raw, self.decimals).unwrap_or_else(|_| raw.to_string())
    }
}

/// Descriptors keyed by token address for the active network.
#[derive(Debug, Default, Clone)]
pub struct TokenCache {
    entries: HashMap<Address, TokenDescriptor>,
}

impl TokenCache {
    pub fn get(&self, address: &Address) -> Option<&TokenDescriptor> {
        self.entries.get(address)
    }

    pub fn insert(&mut self, descriptor: TokenDescriptor) {
        self.entries.insert(descriptor.address, descriptor);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read name, symbol and decimals, substituting placeholders per field.
pub async fn fetch_descriptor(client: &dyn ChainClient, address: Address) -> TokenDescriptor {
    let token = Erc20::new(client, address);
    let (name, symbol, decimals) = tokio::join!(token.name(), token.symbol(), token.decimals());

    let name = name.unwrap_or_else(|e| {
        tracing::debug!(token = %address, error = %e, "name() failed");
        UNKNOWN_NAME.to_string()
    });
    let symbol = symbol.unwrap_or_else(|e| {
        tracing::debug!(token = %address, error = %e, "symbol() failed");
        UNKNOWN_SYMBOL.to_string()
    });
    let decimals = decimals.unwrap_or_else(|e| {
        tracing::debug!(token = %address, error = %e, "decimals() failed");
        DEFAULT_DECIMALS
    });

    TokenDescriptor {
        address,
        name,
        symbol,
        decimals,
    }
}

/// Validate `candidate` and return its descriptor, reading the chain only on
/// a cache miss.
pub async fn validate_token(
    client: &dyn ChainClient,
    cache: &mut TokenCache,
    candidate: &str,
) -> Result<TokenDescriptor, InputError> {
    let address = parse_address(candidate)?;

    if let Some(cached) = cache.get(&address) {
        tracing::debug!(token = %address, "Token descriptor served from cache");
        return Ok(cached.clone());
    }

    let descriptor = fetch_descriptor(client, address).await;
    tracing::info!(
        token = %address,
        name = %descriptor.name,
        symbol = %descriptor.symbol,
        decimals = descriptor.decimals,
        "Token validated"
    );
    cache.insert(descriptor.clone());
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn descriptor(name: &str, symbol: &str, decimals: u8) -> TokenDescriptor {
        TokenDescriptor {
            address: address!("0x2222222222222222222222222222222222222222"),
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }

    #[test]
    fn test_display_truncation() {
        let token = descriptor("A Very Long Token Name Indeed", "SHORT", 18);
        assert_eq!(token.display_name(), "A Very Long Tok...");
        assert_eq!(token.display_symbol(), "SHORT");

        let exact = descriptor("Exactly15Chars!", "X", 18);
        assert_eq!(exact.display_name(), "Exactly15Chars!");
    }

    #[test]
    fn test_format_amount() {
        let usdc = descriptor("USD Coin", "USDC", 6);
        assert_eq!(usdc.format_amount(U256::from(2_500_000u64)), "2.500000");
    }

    #[test]
    fn test_cache() {
        let mut cache = TokenCache::default();
        let token = descriptor("Token", "TKN", 18);
        cache.insert(token.clone());

        assert_eq!(cache.get(&token.address), Some(&token));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
