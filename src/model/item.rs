//! Items and their immutable history (transfers, URI updates).

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::ids::{ItemId, LogId};
use super::BlockStamp;
use crate::storage::{Entity, EntityKind};

/// Resale royalty split, each a fixed-point percentage with 18 decimals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidShares {
    /// Share paid to the creator
    pub creator: U256,
    /// Share paid to the current owner
    pub owner: U256,
    /// Share paid to the previous owner
    pub prev_owner: U256,
}

/// Indexed NFT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Contract address plus token id
    pub id: ItemId,
    /// Transaction that minted the token
    pub transaction_hash: B256,
    /// Current owner (zero after burn)
    pub owner: Address,
    /// Minting account
    pub creator: Address,
    /// Seller in the most recent finalized sale
    pub prev_owner: Address,
    /// Single-token approved operator
    pub approved: Option<Address>,
    /// Content URI
    pub content_uri: String,
    /// Content hash
    pub content_hash: B256,
    /// Metadata URI
    pub metadata_uri: String,
    /// Metadata hash
    pub metadata_hash: B256,
    /// Exchange contract paired with the token contract
    pub exchange_contract: Option<Address>,
    /// Current bid shares (`None` when the exchange never reported them)
    pub bid_shares: Option<BidShares>,
    /// Mint time
    pub created: BlockStamp,
    /// Burn time, if burned
    pub burned: Option<BlockStamp>,
}

impl Item {
    /// Token id
    pub fn token_id(&self) -> U256 {
        self.id.token_id
    }

    /// Token contract address
    pub fn token_contract(&self) -> Address {
        self.id.contract
    }

    /// True once the token has been transferred to the zero address
    pub fn is_burned(&self) -> bool {
        self.burned.is_some()
    }
}

impl Entity for Item {
    type Key = ItemId;
    const KIND: EntityKind = EntityKind::Item;

    fn key(&self) -> ItemId {
        self.id
    }
}

/// Historical token transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Token id plus emitting log position
    pub id: LogId,
    /// Item transferred
    pub item: ItemId,
    /// Sender (zero on mint)
    pub from: Address,
    /// Recipient (zero on burn)
    pub to: Address,
    /// Transaction hash
    pub transaction_hash: B256,
    /// When it happened
    pub created: BlockStamp,
}

impl Entity for Transfer {
    type Key = LogId;
    const KIND: EntityKind = EntityKind::Transfer;

    fn key(&self) -> LogId {
        self.id
    }
}

/// Which URI an update replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UriKind {
    /// `tokenURI`
    Content,
    /// `tokenMetadataURI`
    Metadata,
}

/// Historical URI change, recording the value it replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriUpdate {
    /// Token id plus emitting log position
    pub id: LogId,
    /// Item updated
    pub item: ItemId,
    /// Which URI changed
    pub kind: UriKind,
    /// Previous URI
    pub from: String,
    /// New URI
    pub to: String,
    /// Account that performed the update
    pub updater: Address,
    /// Item owner at the time
    pub owner: Address,
    /// Transaction hash
    pub transaction_hash: B256,
    /// When it happened
    pub created: BlockStamp,
}

impl Entity for UriUpdate {
    type Key = LogId;
    const KIND: EntityKind = EntityKind::UriUpdate;

    fn key(&self) -> LogId {
        self.id
    }
}
