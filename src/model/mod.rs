//! Derived data model maintained by the indexer.
//!
//! Live entities (items, asks, bids, listings) are mutated in place. The
//! `Inactive*`, [`Transfer`] and [`UriUpdate`] records are written once and
//! never touched again.

use serde::{Deserialize, Serialize};

pub mod account;
pub mod auction;
pub mod ids;
pub mod item;
pub mod market;

pub use account::{Currency, User};
pub use auction::{
    InactiveReserveListingBid, ListingStatus, ReserveBidTermination, ReserveListing,
    ReserveListingBid,
};
pub use ids::{AskId, BidId, EntityKey, ItemId, ListingId, LogId, ReserveBidId};
pub use item::{BidShares, Item, Transfer, UriKind, UriUpdate};
pub use market::{Ask, Bid, InactiveAsk, InactiveBid, TerminationReason};

/// When something happened on chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStamp {
    /// Block timestamp (unix seconds)
    pub timestamp: u64,
    /// Block number
    pub block_number: u64,
}

impl BlockStamp {
    /// Create a stamp
    pub fn new(timestamp: u64, block_number: u64) -> Self {
        Self {
            timestamp,
            block_number,
        }
    }
}
