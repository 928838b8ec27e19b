//! Asks, bids and their inactive snapshots.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::ids::{AskId, BidId, ItemId, LogId};
use super::BlockStamp;
use crate::storage::{Entity, EntityKind};

/// Why a live ask or bid stopped being live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Withdrawn, or superseded by a newer one on the same key
    Removed,
    /// Accepted; the item changed hands
    Finalized,
}

/// Live sell order. At most one per (item, owner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ask {
    /// (item, owner)
    pub id: AskId,
    /// Asking price
    pub amount: U256,
    /// Currency of the price
    pub currency: Address,
    /// Transaction of the most recent AskCreated
    pub transaction_hash: B256,
    /// When the current terms were set
    pub created: BlockStamp,
}

impl Ask {
    /// Item offered
    pub fn item(&self) -> ItemId {
        self.id.item
    }

    /// Owner offering it
    pub fn owner(&self) -> Address {
        self.id.owner
    }
}

impl Entity for Ask {
    type Key = AskId;
    const KIND: EntityKind = EntityKind::Ask;

    fn key(&self) -> AskId {
        self.id
    }
}

/// Snapshot of an ask as it was right before it was replaced or removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveAsk {
    /// Token id plus the terminating event's log position
    pub id: LogId,
    /// Item offered
    pub item: ItemId,
    /// Termination reason
    pub reason: TerminationReason,
    /// Asking price at termination
    pub amount: U256,
    /// Currency of the price
    pub currency: Address,
    /// Owner offering it
    pub owner: Address,
    /// Transaction of the terminating event
    pub transaction_hash: B256,
    /// When the snapshotted terms were set
    pub created: BlockStamp,
    /// When they stopped being live
    pub inactivated: BlockStamp,
}

impl Entity for InactiveAsk {
    type Key = LogId;
    const KIND: EntityKind = EntityKind::InactiveAsk;

    fn key(&self) -> LogId {
        self.id
    }
}

/// Live offer to buy. At most one per (item, bidder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// (item, bidder)
    pub id: BidId,
    /// Offered amount
    pub amount: U256,
    /// Currency of the offer
    pub currency: Address,
    /// Share the bidder grants the next seller on resale
    pub sell_on_share: U256,
    /// Account receiving the item if accepted
    pub recipient: Address,
    /// Transaction of the BidCreated
    pub transaction_hash: B256,
    /// When the bid was placed
    pub created: BlockStamp,
}

impl Bid {
    /// Item bid on
    pub fn item(&self) -> ItemId {
        self.id.item
    }

    /// Bidder
    pub fn bidder(&self) -> Address {
        self.id.bidder
    }
}

impl Entity for Bid {
    type Key = BidId;
    const KIND: EntityKind = EntityKind::Bid;

    fn key(&self) -> BidId {
        self.id
    }
}

/// Snapshot of a bid that was removed or finalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveBid {
    /// Token id plus the terminating event's log position
    pub id: LogId,
    /// Item bid on
    pub item: ItemId,
    /// Termination reason
    pub reason: TerminationReason,
    /// Offered amount
    pub amount: U256,
    /// Currency of the offer
    pub currency: Address,
    /// Sell-on share
    pub sell_on_share: U256,
    /// Bidder
    pub bidder: Address,
    /// Recipient
    pub recipient: Address,
    /// Transaction of the terminating event
    pub transaction_hash: B256,
    /// When the bid was placed
    pub created: BlockStamp,
    /// When it stopped being live
    pub inactivated: BlockStamp,
}

impl Entity for InactiveBid {
    type Key = LogId;
    const KIND: EntityKind = EntityKind::InactiveBid;

    fn key(&self) -> LogId {
        self.id
    }
}
