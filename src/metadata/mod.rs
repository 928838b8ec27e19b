//! Read-only contract calls the indexer depends on.
//!
//! Calls are synchronous and may revert. A revert is a data-unavailable
//! result ([`CallReverted`]), never a retryable fault: callers substitute a
//! degraded value and move on.

use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

use crate::model::BidShares;

pub mod fixture;

pub use fixture::StaticChain;

/// A contract call reverted (or the contract does not exist)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("contract call reverted")]
pub struct CallReverted;

/// Result of a contract call
pub type CallResult<T> = std::result::Result<T, CallReverted>;

/// `bytes32` value some broken ERC-20s return instead of a name or symbol
pub const DEGENERATE_BYTES32: B256 = B256::with_last_byte(1);

// ═══════════════════════════════════════════════════════════════════════════════
// COLLABORATOR TRAITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Item token and exchange views
pub trait TokenMetadataSource {
    /// `tokenURI(tokenId)` on the item contract
    fn token_uri(&self, contract: Address, token_id: U256) -> CallResult<String>;

    /// `tokenMetadataURI(tokenId)` on the item contract
    fn token_metadata_uri(&self, contract: Address, token_id: U256) -> CallResult<String>;

    /// `tokenContentHashes(tokenId)` on the item contract
    fn token_content_hash(&self, contract: Address, token_id: U256) -> CallResult<B256>;

    /// `tokenMetadataHashes(tokenId)` on the item contract
    fn token_metadata_hash(&self, contract: Address, token_id: U256) -> CallResult<B256>;

    /// Exchange contract paired with an item contract
    fn exchange_contract(&self, item_contract: Address) -> CallResult<Address>;

    /// `bidSharesForToken(tokenId)` on an exchange
    fn bid_shares_for_token(&self, exchange: Address, token_id: U256) -> CallResult<BidShares>;
}

/// ERC-20 views, including the `bytes32` variants legacy tokens expose
pub trait CurrencyMetadataSource {
    /// `name() returns (string)`
    fn name(&self, token: Address) -> CallResult<String>;

    /// `name() returns (bytes32)`
    fn name_bytes32(&self, token: Address) -> CallResult<B256>;

    /// `symbol() returns (string)`
    fn symbol(&self, token: Address) -> CallResult<String>;

    /// `symbol() returns (bytes32)`
    fn symbol_bytes32(&self, token: Address) -> CallResult<B256>;

    /// `decimals() returns (uint8)`
    fn decimals(&self, token: Address) -> CallResult<u8>;
}

/// Everything the indexer reads from chain
pub trait ChainReader: TokenMetadataSource + CurrencyMetadataSource {}

impl<T: TokenMetadataSource + CurrencyMetadataSource> ChainReader for T {}

/// Decode a right-padded `bytes32` string
pub fn bytes32_to_string(value: &B256) -> String {
    let end = value
        .iter()
        .rposition(|b| *b != 0)
        .map(|i| i + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&value[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes32_to_string() {
        let mut raw = [0u8; 32];
        raw[..3].copy_from_slice(b"MKR");
        assert_eq!(bytes32_to_string(&B256::from(raw)), "MKR");
        assert_eq!(bytes32_to_string(&B256::ZERO), "");
    }

    #[test]
    fn test_degenerate_sentinel() {
        assert_eq!(
            format!("0x{}", hex::encode(DEGENERATE_BYTES32)),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }
}
