//! Structured identifiers for indexed entities.
//!
//! Every composite key encodes to a fixed-width big-endian byte string, so
//! two distinct keys can never collide the way delimiter-joined strings can.
//! `Display` renders the familiar dash-joined form and is meant for logs only.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A key that can be stored under an entity prefix
pub trait EntityKey: fmt::Display {
    /// Canonical, fixed-width byte encoding
    fn encode(&self) -> Vec<u8>;
}

fn hex_addr(addr: &Address) -> String {
    format!("0x{}", hex::encode(addr))
}

impl EntityKey for Address {
    fn encode(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ITEM
// ═══════════════════════════════════════════════════════════════════════════════

/// An NFT: the token contract plus the token id within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId {
    /// Token contract address
    pub contract: Address,
    /// Token id within the contract
    pub token_id: U256,
}

impl ItemId {
    /// Create an item id
    pub fn new(contract: Address, token_id: U256) -> Self {
        Self { contract, token_id }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", hex_addr(&self.contract), self.token_id)
    }
}

impl EntityKey for ItemId {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(52);
        out.extend_from_slice(self.contract.as_slice());
        out.extend_from_slice(&self.token_id.to_be_bytes::<32>());
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASK / BID
// ═══════════════════════════════════════════════════════════════════════════════

/// Live ask key: one per (item, owner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AskId {
    /// Item the ask is for
    pub item: ItemId,
    /// Owner offering the item
    pub owner: Address,
}

impl AskId {
    /// Create an ask id
    pub fn new(item: ItemId, owner: Address) -> Self {
        Self { item, owner }
    }
}

impl fmt::Display for AskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.item, hex_addr(&self.owner))
    }
}

impl EntityKey for AskId {
    fn encode(&self) -> Vec<u8> {
        let mut out = self.item.encode();
        out.extend_from_slice(self.owner.as_slice());
        out
    }
}

/// Live bid key: one per (item, bidder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BidId {
    /// Item the bid is for
    pub item: ItemId,
    /// Account placing the bid
    pub bidder: Address,
}

impl BidId {
    /// Create a bid id
    pub fn new(item: ItemId, bidder: Address) -> Self {
        Self { item, bidder }
    }
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.item, hex_addr(&self.bidder))
    }
}

impl EntityKey for BidId {
    fn encode(&self) -> Vec<u8> {
        let mut out = self.item.encode();
        out.extend_from_slice(self.bidder.as_slice());
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOG POSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// Identity of a historical record: token id plus the emitting log's position.
///
/// Used for transfers, URI updates and inactive asks/bids. The log index makes
/// it unique within a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogId {
    /// Token id the record concerns
    pub token_id: U256,
    /// Transaction hash
    pub tx_hash: B256,
    /// Log index within the transaction
    pub log_index: u64,
}

impl LogId {
    /// Create a log id
    pub fn new(token_id: U256, tx_hash: B256, log_index: u64) -> Self {
        Self {
            token_id,
            tx_hash,
            log_index,
        }
    }

    /// Same token and transaction, `offset` log positions earlier.
    ///
    /// Returns `None` when the offset reaches before the first log.
    pub fn earlier(&self, offset: u64) -> Option<Self> {
        self.log_index.checked_sub(offset).map(|log_index| Self {
            log_index,
            ..*self
        })
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-0x{}-{}",
            self.token_id,
            hex::encode(self.tx_hash),
            self.log_index
        )
    }
}

impl EntityKey for LogId {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(72);
        out.extend_from_slice(&self.token_id.to_be_bytes::<32>());
        out.extend_from_slice(self.tx_hash.as_slice());
        out.extend_from_slice(&self.log_index.to_be_bytes());
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESERVE LISTINGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Reserve listing (auction) id assigned by the auction house
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub U256);

impl ListingId {
    /// Create a listing id from a plain integer
    pub fn from_u64(id: u64) -> Self {
        Self(U256::from(id))
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl EntityKey for ListingId {
    fn encode(&self) -> Vec<u8> {
        self.0.to_be_bytes::<32>().to_vec()
    }
}

/// Reserve listing bid id.
///
/// A live bid and the inactive record that archives it share this id; they
/// live in separate keyspaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReserveBidId {
    /// Listing the bid was placed on
    pub listing: ListingId,
    /// Transaction that placed the bid
    pub tx_hash: B256,
    /// Log index of the bid event
    pub log_index: u64,
}

impl ReserveBidId {
    /// Create a reserve bid id
    pub fn new(listing: ListingId, tx_hash: B256, log_index: u64) -> Self {
        Self {
            listing,
            tx_hash,
            log_index,
        }
    }
}

impl fmt::Display for ReserveBidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-0x{}-{}",
            self.listing,
            hex::encode(self.tx_hash),
            self.log_index
        )
    }
}

impl EntityKey for ReserveBidId {
    fn encode(&self) -> Vec<u8> {
        let mut out = self.listing.encode();
        out.extend_from_slice(self.tx_hash.as_slice());
        out.extend_from_slice(&self.log_index.to_be_bytes());
        out
    }
}
