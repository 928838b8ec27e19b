//! Reserve listings (time-boxed auctions) and their bids.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::ids::{ItemId, ListingId, ReserveBidId};
use super::BlockStamp;
use crate::storage::{Entity, EntityKind};

/// Listing status. `Finished` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Accepting bids
    Active,
    /// Ended without a winning bid, or canceled by the owner
    Canceled,
    /// Ended with a winning bid
    Finished,
}

impl ListingStatus {
    /// True for `Finished` and `Canceled`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ListingStatus::Active)
    }
}

/// A reserve auction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveListing {
    /// Auction house id
    pub id: ListingId,
    /// Token being auctioned (contract + token id)
    pub token: ItemId,
    /// Matching indexed item, if the token has been seen minted
    pub item: Option<ItemId>,
    /// Transaction that created the listing
    pub transaction_hash: B256,
    /// Whether the curator approval is in place
    pub approved: bool,
    /// When approval was last granted
    pub approved_timestamp: Option<u64>,
    /// Lifecycle status
    pub status: ListingStatus,
    /// Earliest start time
    pub starts_at: u64,
    /// Duration in seconds, counted from the first bid
    pub duration: u64,
    /// Time of the first bid, 0 until one arrives
    pub first_bid_time: u64,
    /// `first_bid_time + duration`, once a bid exists
    pub expected_end_timestamp: Option<u64>,
    /// Minimum first bid
    pub reserve_price: U256,
    /// Auction house listing type
    pub list_type: u8,
    /// Intermediary fee percentage
    pub intermediary_fee_percentage: u8,
    /// Live bid, if any
    pub current_bid: Option<ReserveBidId>,
    /// Token owner who created the listing
    pub token_owner: Address,
    /// Curator / intermediary
    pub intermediary: Address,
    /// Currency bids are denominated in
    pub currency: Address,
    /// Creation time
    pub created: BlockStamp,
    /// End or cancel time
    pub finalized: Option<BlockStamp>,
}

impl ReserveListing {
    /// Record the first bid time and derive the expected end
    pub fn start_clock(&mut self, first_bid_time: u64) {
        self.first_bid_time = first_bid_time;
        self.expected_end_timestamp = Some(self.duration.saturating_add(first_bid_time));
    }

    /// Replace the duration and re-derive the expected end
    pub fn extend(&mut self, duration: u64) {
        self.duration = duration;
        self.expected_end_timestamp = Some(self.first_bid_time.saturating_add(duration));
    }
}

impl Entity for ReserveListing {
    type Key = ListingId;
    const KIND: EntityKind = EntityKind::ReserveListing;

    fn key(&self) -> ListingId {
        self.id
    }
}

/// The live bid on a listing. At most one per listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveListingBid {
    /// Listing plus placing log position
    pub id: ReserveBidId,
    /// Listing bid on
    pub listing: ListingId,
    /// Bid amount
    pub amount: U256,
    /// Bidder
    pub bidder: Address,
    /// Transaction that placed the bid
    pub transaction_hash: B256,
    /// When the bid was placed
    pub created: BlockStamp,
}

impl Entity for ReserveListingBid {
    type Key = ReserveBidId;
    const KIND: EntityKind = EntityKind::ReserveListingBid;

    fn key(&self) -> ReserveBidId {
        self.id
    }
}

/// Why a reserve listing bid stopped being live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReserveBidTermination {
    /// Won the auction
    Final,
    /// Outbid (or listing canceled) and refunded
    Refunded,
}

/// Archive of a superseded reserve listing bid, under the live bid's id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveReserveListingBid {
    /// Same id as the live bid it archives
    pub id: ReserveBidId,
    /// Listing bid on
    pub listing: ListingId,
    /// Bid amount
    pub amount: U256,
    /// Bidder
    pub bidder: Address,
    /// Termination reason
    pub reason: ReserveBidTermination,
    /// Transaction that placed the original bid
    pub transaction_hash: B256,
    /// When the original bid was placed
    pub created: BlockStamp,
    /// When it stopped being live
    pub inactivated: BlockStamp,
}

impl InactiveReserveListingBid {
    /// Archive a live bid, keeping its identity and creation metadata
    pub fn archive(
        bid: &ReserveListingBid,
        reason: ReserveBidTermination,
        inactivated: BlockStamp,
    ) -> Self {
        Self {
            id: bid.id,
            listing: bid.listing,
            amount: bid.amount,
            bidder: bid.bidder,
            reason,
            transaction_hash: bid.transaction_hash,
            created: bid.created,
            inactivated,
        }
    }
}

impl Entity for InactiveReserveListingBid {
    type Key = ReserveBidId;
    const KIND: EntityKind = EntityKind::InactiveReserveListingBid;

    fn key(&self) -> ReserveBidId {
        self.id
    }
}
