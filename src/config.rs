//! Indexer configuration.
//!
//! Loaded once at startup (JSON file, then `MOTIF_*` environment overrides),
//! validated, and turned into an immutable [`AllowList`] that is handed to
//! the router.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::events::EventClass;
use crate::lifecycle::LifecycleSettings;

/// Default distance, in log positions, from a `BidFinalized` back to the
/// `Transfer` it settles
pub const DEFAULT_FINALIZE_TRANSFER_OFFSET: u64 = 2;

// ═══════════════════════════════════════════════════════════════════════════════
// MISSING REFERENT POLICY
// ═══════════════════════════════════════════════════════════════════════════════

/// What to do when a handler cannot find an entity the protocol guarantees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingReferentPolicy {
    /// Log it, record it on the event outcome, continue best-effort
    #[default]
    Report,
    /// Abort the event with an error
    Fail,
}

impl MissingReferentPolicy {
    /// Policy name
    pub fn name(&self) -> &'static str {
        match self {
            MissingReferentPolicy::Report => "report",
            MissingReferentPolicy::Fail => "fail",
        }
    }
}

impl std::str::FromStr for MissingReferentPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "report" | "log" => Ok(MissingReferentPolicy::Report),
            "fail" | "strict" => Ok(MissingReferentPolicy::Fail),
            _ => Err(ConfigError::Validation(format!(
                "Unknown missing referent policy: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for MissingReferentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INDEXER CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// An exchange contract and the item contract whose tokens it trades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePairing {
    /// Exchange contract address
    pub exchange: Address,
    /// Paired item contract address
    pub item_contract: Address,
}

/// Indexer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Item (ERC-721) contracts to index
    pub item_contracts: Vec<Address>,
    /// Exchange contracts to index, each paired with its item contract
    pub exchanges: Vec<ExchangePairing>,
    /// Reserve auction houses to index
    pub auction_houses: Vec<Address>,
    /// Log positions between a `Transfer` and the `BidFinalized` that follows it
    pub finalize_transfer_offset: u64,
    /// Missing referent handling
    pub missing_referent_policy: MissingReferentPolicy,
    /// Decimals recorded when a currency's `decimals()` reverts
    pub fallback_decimals: Option<u8>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            item_contracts: Vec::new(),
            exchanges: Vec::new(),
            auction_houses: Vec::new(),
            finalize_transfer_offset: DEFAULT_FINALIZE_TRANSFER_OFFSET,
            missing_referent_policy: MissingReferentPolicy::Report,
            fallback_decimals: None,
        }
    }
}

impl IndexerConfig {
    /// Load from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply `MOTIF_*` environment overrides on top of this configuration
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(list) = std::env::var("MOTIF_ITEM_CONTRACTS") {
            self.item_contracts = parse_address_list(&list)?;
        }

        if let Ok(list) = std::env::var("MOTIF_EXCHANGES") {
            self.exchanges = parse_pairings(&list)?;
        }

        if let Ok(list) = std::env::var("MOTIF_AUCTION_HOUSES") {
            self.auction_houses = parse_address_list(&list)?;
        }

        if let Ok(offset) = std::env::var("MOTIF_FINALIZE_TRANSFER_OFFSET") {
            self.finalize_transfer_offset = offset.trim().parse().map_err(|_| {
                ConfigError::Parse(format!("Invalid finalize transfer offset: {}", offset))
            })?;
        }

        if let Ok(policy) = std::env::var("MOTIF_MISSING_REFERENT_POLICY") {
            self.missing_referent_policy = policy.parse()?;
        }

        if let Ok(decimals) = std::env::var("MOTIF_FALLBACK_DECIMALS") {
            let decimals = decimals.trim();
            self.fallback_decimals = if decimals.is_empty() {
                None
            } else {
                Some(decimals.parse().map_err(|_| {
                    ConfigError::Parse(format!("Invalid fallback decimals: {}", decimals))
                })?)
            };
        }

        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.finalize_transfer_offset == 0 {
            return Err(ConfigError::Validation(
                "Finalize transfer offset must be greater than 0".into(),
            ));
        }

        let items: HashSet<_> = self.item_contracts.iter().collect();
        let mut seen = HashSet::new();

        for address in self
            .item_contracts
            .iter()
            .chain(self.exchanges.iter().map(|p| &p.exchange))
            .chain(self.auction_houses.iter())
        {
            if !seen.insert(address) {
                return Err(ConfigError::Validation(format!(
                    "Contract 0x{} is listed more than once",
                    hex::encode(address)
                )));
            }
        }

        for pairing in &self.exchanges {
            if !items.contains(&pairing.item_contract) {
                return Err(ConfigError::Validation(format!(
                    "Exchange 0x{} is paired with unlisted item contract 0x{}",
                    hex::encode(pairing.exchange),
                    hex::encode(pairing.item_contract)
                )));
            }
        }

        Ok(())
    }

    /// Build the immutable allow-list
    pub fn allow_list(&self) -> AllowList {
        AllowList::from_config(self)
    }

    /// Settings the lifecycle handlers read
    pub fn lifecycle_settings(&self) -> LifecycleSettings {
        LifecycleSettings {
            finalize_transfer_offset: self.finalize_transfer_offset,
            fallback_decimals: self.fallback_decimals,
            missing_referent_policy: self.missing_referent_policy,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ALLOW LIST
// ═══════════════════════════════════════════════════════════════════════════════

/// Recognized source contracts per event class. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    item_contracts: HashSet<Address>,
    exchanges: HashMap<Address, Address>,
    auction_houses: HashSet<Address>,
}

impl AllowList {
    /// Build from a configuration
    pub fn from_config(config: &IndexerConfig) -> Self {
        Self {
            item_contracts: config.item_contracts.iter().copied().collect(),
            exchanges: config
                .exchanges
                .iter()
                .map(|p| (p.exchange, p.item_contract))
                .collect(),
            auction_houses: config.auction_houses.iter().copied().collect(),
        }
    }

    /// Whether `address` is a recognized emitter for `class`
    pub fn allows(&self, class: EventClass, address: &Address) -> bool {
        match class {
            EventClass::ItemContract => self.item_contracts.contains(address),
            EventClass::Exchange => self.exchanges.contains_key(address),
            EventClass::AuctionHouse => self.auction_houses.contains(address),
        }
    }

    /// Item contract an exchange trades
    pub fn paired_item_contract(&self, exchange: &Address) -> Option<Address> {
        self.exchanges.get(exchange).copied()
    }

    /// Whether `address` is a recognized item contract
    pub fn is_item_contract(&self, address: &Address) -> bool {
        self.item_contracts.contains(address)
    }

    /// Number of recognized contracts across all classes
    pub fn len(&self) -> usize {
        self.item_contracts.len() + self.exchanges.len() + self.auction_houses.len()
    }

    /// True when nothing is recognized
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration error
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Parse error
    Parse(String),
    /// Serialization error
    Serialize(String),
    /// Validation error
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(err: ConfigError) -> Self {
        crate::error::Error::InvalidConfig {
            name: "indexer".into(),
            reason: err.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPER FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_address(value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| ConfigError::Parse(format!("Invalid address {}: {}", value.trim(), e)))
}

/// Comma-separated addresses
fn parse_address_list(list: &str) -> Result<Vec<Address>, ConfigError> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_address)
        .collect()
}

/// Comma-separated `exchange=item_contract` pairs
fn parse_pairings(list: &str) -> Result<Vec<ExchangePairing>, ConfigError> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|pair| {
            let (exchange, item_contract) = pair.split_once('=').ok_or_else(|| {
                ConfigError::Parse(format!("Expected exchange=item_contract, got {}", pair))
            })?;
            Ok(ExchangePairing {
                exchange: parse_address(exchange)?,
                item_contract: parse_address(item_contract)?,
            })
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IndexerConfig {
        IndexerConfig {
            item_contracts: vec![Address::repeat_byte(0x10)],
            exchanges: vec![ExchangePairing {
                exchange: Address::repeat_byte(0xe0),
                item_contract: Address::repeat_byte(0x10),
            }],
            auction_houses: vec![Address::repeat_byte(0xa0)],
            ..Default::default()
        }
    }

    #[test]
    fn test_config_default() {
        let config = IndexerConfig::default();
        assert_eq!(config.finalize_transfer_offset, 2);
        assert_eq!(config.missing_referent_policy, MissingReferentPolicy::Report);
        assert!(config.fallback_decimals.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(sample().validate().is_ok());

        let mut config = sample();
        config.finalize_transfer_offset = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.auction_houses.push(Address::repeat_byte(0x10));
        assert!(config.validate().is_err());

        let mut config = sample();
        config.item_contracts.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_allow_list() {
        let allow = sample().allow_list();
        let item = Address::repeat_byte(0x10);
        let exchange = Address::repeat_byte(0xe0);

        assert!(allow.allows(EventClass::ItemContract, &item));
        assert!(!allow.allows(EventClass::Exchange, &item));
        assert!(allow.allows(EventClass::Exchange, &exchange));
        assert_eq!(allow.paired_item_contract(&exchange), Some(item));
        assert!(allow.allows(EventClass::AuctionHouse, &Address::repeat_byte(0xa0)));
        assert_eq!(allow.len(), 3);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "fail".parse::<MissingReferentPolicy>().unwrap(),
            MissingReferentPolicy::Fail
        );
        assert_eq!(
            "Report".parse::<MissingReferentPolicy>().unwrap(),
            MissingReferentPolicy::Report
        );
        assert!("ignore".parse::<MissingReferentPolicy>().is_err());
        assert_eq!(MissingReferentPolicy::Fail.to_string(), "fail");
    }

    #[test]
    fn test_parse_pairings() {
        let exchange = format!("0x{}", hex::encode(Address::repeat_byte(0xe0)));
        let item = format!("0x{}", hex::encode(Address::repeat_byte(0x10)));
        let pairs = parse_pairings(&format!("{}={}", exchange, item)).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].item_contract, Address::repeat_byte(0x10));

        assert!(parse_pairings("0x01").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("indexer.json");

        let config = sample();
        config.save(&path).unwrap();
        assert_eq!(IndexerConfig::load(&path).unwrap(), config);
    }
}
