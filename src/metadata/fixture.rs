//! In-memory chain reader loaded from a JSON fixture.
//!
//! Any value left out of the fixture behaves like a reverted call.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{CallResult, CallReverted, CurrencyMetadataSource, TokenMetadataSource};
use crate::error::{Error, Result};
use crate::model::BidShares;

/// Item token views for one token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Item contract
    pub contract: Address,
    /// Token id
    pub token_id: U256,
    /// `tokenURI`
    pub content_uri: Option<String>,
    /// `tokenMetadataURI`
    pub metadata_uri: Option<String>,
    /// `tokenContentHashes`
    pub content_hash: Option<B256>,
    /// `tokenMetadataHashes`
    pub metadata_hash: Option<B256>,
}

/// Item contract ↔ exchange pairing, plus the exchange's bid shares
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// Item contract
    pub item_contract: Address,
    /// Paired exchange
    pub exchange: Address,
    /// `bidSharesForToken` results by token id
    #[serde(default)]
    pub bid_shares: Vec<(U256, BidShares)>,
}

/// ERC-20 views for one currency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    /// Token address
    pub address: Address,
    /// `name() returns (string)`
    pub name: Option<String>,
    /// `name() returns (bytes32)`
    pub name_bytes32: Option<B256>,
    /// `symbol() returns (string)`
    pub symbol: Option<String>,
    /// `symbol() returns (bytes32)`
    pub symbol_bytes32: Option<B256>,
    /// `decimals()`
    pub decimals: Option<u8>,
}

/// Fixture-backed [`super::ChainReader`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticChain {
    /// Token views
    #[serde(default)]
    pub tokens: Vec<TokenRecord>,
    /// Exchange pairings
    #[serde(default)]
    pub exchanges: Vec<ExchangeRecord>,
    /// Currency views
    #[serde(default)]
    pub currencies: Vec<CurrencyRecord>,
}

impl StaticChain {
    /// Empty chain: every call reverts
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fixture from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Storage(format!("Failed to read chain fixture: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Deserialization(format!("Invalid chain fixture: {}", e)))
    }

    /// Add a token
    pub fn with_token(mut self, token: TokenRecord) -> Self {
        self.tokens.push(token);
        self
    }

    /// Pair an item contract with an exchange
    pub fn with_exchange(mut self, item_contract: Address, exchange: Address) -> Self {
        self.exchanges.push(ExchangeRecord {
            item_contract,
            exchange,
            bid_shares: Vec::new(),
        });
        self
    }

    /// Set the bid shares an exchange reports for a token
    pub fn with_bid_shares(mut self, exchange: Address, token_id: U256, shares: BidShares) -> Self {
        match self.exchanges.iter_mut().find(|e| e.exchange == exchange) {
            Some(record) => record.bid_shares.push((token_id, shares)),
            None => self.exchanges.push(ExchangeRecord {
                item_contract: Address::ZERO,
                exchange,
                bid_shares: vec![(token_id, shares)],
            }),
        }
        self
    }

    /// Add a currency
    pub fn with_currency(mut self, currency: CurrencyRecord) -> Self {
        self.currencies.push(currency);
        self
    }

    fn token(&self, contract: Address, token_id: U256) -> CallResult<&TokenRecord> {
        self.tokens
            .iter()
            .find(|t| t.contract == contract && t.token_id == token_id)
            .ok_or(CallReverted)
    }

    fn currency(&self, token: Address) -> CallResult<&CurrencyRecord> {
        self.currencies
            .iter()
            .find(|c| c.address == token)
            .ok_or(CallReverted)
    }
}

impl TokenMetadataSource for StaticChain {
    fn token_uri(&self, contract: Address, token_id: U256) -> CallResult<String> {
        self.token(contract, token_id)?
            .content_uri
            .clone()
            .ok_or(CallReverted)
    }

    fn token_metadata_uri(&self, contract: Address, token_id: U256) -> CallResult<String> {
        self.token(contract, token_id)?
            .metadata_uri
            .clone()
            .ok_or(CallReverted)
    }

    fn token_content_hash(&self, contract: Address, token_id: U256) -> CallResult<B256> {
        self.token(contract, token_id)?.content_hash.ok_or(CallReverted)
    }

    fn token_metadata_hash(&self, contract: Address, token_id: U256) -> CallResult<B256> {
        self.token(contract, token_id)?.metadata_hash.ok_or(CallReverted)
    }

    fn exchange_contract(&self, item_contract: Address) -> CallResult<Address> {
        self.exchanges
            .iter()
            .find(|e| e.item_contract == item_contract)
            .map(|e| e.exchange)
            .ok_or(CallReverted)
    }

    fn bid_shares_for_token(&self, exchange: Address, token_id: U256) -> CallResult<BidShares> {
        self.exchanges
            .iter()
            .filter(|e| e.exchange == exchange)
            .flat_map(|e| e.bid_shares.iter())
            .find(|(id, _)| *id == token_id)
            .map(|(_, shares)| *shares)
            .ok_or(CallReverted)
    }
}

impl CurrencyMetadataSource for StaticChain {
    fn name(&self, token: Address) -> CallResult<String> {
        self.currency(token)?.name.clone().ok_or(CallReverted)
    }

    fn name_bytes32(&self, token: Address) -> CallResult<B256> {
        self.currency(token)?.name_bytes32.ok_or(CallReverted)
    }

    fn symbol(&self, token: Address) -> CallResult<String> {
        self.currency(token)?.symbol.clone().ok_or(CallReverted)
    }

    fn symbol_bytes32(&self, token: Address) -> CallResult<B256> {
        self.currency(token)?.symbol_bytes32.ok_or(CallReverted)
    }

    fn decimals(&self, token: Address) -> CallResult<u8> {
        self.currency(token)?.decimals.ok_or(CallReverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_revert() {
        let chain = StaticChain::new();
        assert_eq!(chain.name(Address::repeat_byte(1)), Err(CallReverted));
        assert_eq!(
            chain.token_uri(Address::repeat_byte(1), U256::from(1u64)),
            Err(CallReverted)
        );
    }

    #[test]
    fn test_bid_shares_lookup() {
        let exchange = Address::repeat_byte(0xe0);
        let item = Address::repeat_byte(0x10);
        let shares = BidShares {
            creator: U256::from(10u64),
            owner: U256::from(85u64),
            prev_owner: U256::from(5u64),
        };
        let chain = StaticChain::new()
            .with_exchange(item, exchange)
            .with_bid_shares(exchange, U256::from(7u64), shares);

        assert_eq!(chain.exchange_contract(item), Ok(exchange));
        assert_eq!(chain.bid_shares_for_token(exchange, U256::from(7u64)), Ok(shares));
        assert!(chain.bid_shares_for_token(exchange, U256::from(8u64)).is_err());
    }

    #[test]
    fn test_fixture_json_roundtrip() {
        let chain = StaticChain::new().with_currency(CurrencyRecord {
            address: Address::repeat_byte(0xc0),
            name: Some("Wrapped Ether".into()),
            symbol: Some("WETH".into()),
            decimals: Some(18),
            ..Default::default()
        });
        let json = serde_json::to_string(&chain).unwrap();
        let back: StaticChain = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chain);
    }
}
