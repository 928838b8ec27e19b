//! Decoded contract events consumed by the indexer.
//!
//! Decoding raw logs happens upstream; this module only defines the typed
//! shape every event arrives in. Events must be delivered exactly once, in
//! canonical chain order (block, then transaction, then log).

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::model::{BlockStamp, ListingId, LogId};

pub mod params;

pub use params::*;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT METADATA
// ═══════════════════════════════════════════════════════════════════════════════

/// Chain context every event carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    /// Contract that emitted the log
    pub address: Address,
    /// Block number
    pub block_number: u64,
    /// Block timestamp (unix seconds)
    pub block_timestamp: u64,
    /// Transaction hash
    pub tx_hash: B256,
    /// Log index within the transaction
    pub log_index: u64,
}

impl EventMeta {
    /// Block time and number
    pub fn stamp(&self) -> BlockStamp {
        BlockStamp::new(self.block_timestamp, self.block_number)
    }

    /// Identity of a historical record created by this event for `token_id`
    pub fn log_id(&self, token_id: U256) -> LogId {
        LogId::new(token_id, self.tx_hash, self.log_index)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT CLASSES
// ═══════════════════════════════════════════════════════════════════════════════

/// Which family of contracts may emit an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventClass {
    /// ERC-721 item token contracts
    ItemContract,
    /// Ask/bid exchange contracts paired with an item contract
    Exchange,
    /// Reserve auction houses
    AuctionHouse,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// One decoded event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Chain context
    pub meta: EventMeta,
    /// Event-specific parameters
    pub kind: EventKind,
}

impl MarketEvent {
    /// Create an event
    pub fn new(meta: EventMeta, kind: EventKind) -> Self {
        Self { meta, kind }
    }
}

/// Every event the indexer understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "params")]
pub enum EventKind {
    // Item contract
    /// ERC-721 Transfer (mint when `from` is zero, burn when `to` is zero)
    Transfer(TransferParams),
    /// ERC-721 Approval
    Approval(ApprovalParams),
    /// ERC-721 ApprovalForAll
    ApprovalForAll(ApprovalForAllParams),
    /// Content URI changed
    TokenUriUpdated(UriUpdatedParams),
    /// Metadata URI changed
    TokenMetadataUriUpdated(UriUpdatedParams),

    // Exchange
    /// Bid shares overwritten
    BidShareUpdated(BidShareUpdatedParams),
    /// Ask placed or replaced
    AskCreated(AskParams),
    /// Ask withdrawn
    AskRemoved(AskParams),
    /// Bid placed
    BidCreated(BidParams),
    /// Bid withdrawn
    BidRemoved(BidParams),
    /// Bid accepted
    BidFinalized(BidParams),

    // Auction house
    /// Reserve listing opened
    ReserveListingCreated(ReserveListingCreatedParams),
    /// Curator approval changed
    ReserveListingApprovalUpdated(ReserveListingApprovalParams),
    /// Reserve price changed
    ReserveListingReservePriceUpdated(ReserveListingPriceParams),
    /// Bid placed on a reserve listing
    ReserveListingBid(ReserveListingBidParams),
    /// Listing duration extended
    ReserveListingDurationExtended(ReserveListingDurationParams),
    /// Listing settled
    ReserveListingEnded(ReserveListingEndedParams),
    /// Listing canceled by its owner
    ReserveListingCanceled(ReserveListingCanceledParams),
}

impl EventKind {
    /// Contract family allowed to emit this event
    pub fn class(&self) -> EventClass {
        match self {
            Self::Transfer(_)
            | Self::Approval(_)
            | Self::ApprovalForAll(_)
            | Self::TokenUriUpdated(_)
            | Self::TokenMetadataUriUpdated(_) => EventClass::ItemContract,
            Self::BidShareUpdated(_)
            | Self::AskCreated(_)
            | Self::AskRemoved(_)
            | Self::BidCreated(_)
            | Self::BidRemoved(_)
            | Self::BidFinalized(_) => EventClass::Exchange,
            Self::ReserveListingCreated(_)
            | Self::ReserveListingApprovalUpdated(_)
            | Self::ReserveListingReservePriceUpdated(_)
            | Self::ReserveListingBid(_)
            | Self::ReserveListingDurationExtended(_)
            | Self::ReserveListingEnded(_)
            | Self::ReserveListingCanceled(_) => EventClass::AuctionHouse,
        }
    }

    /// Event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer(_) => "Transfer",
            Self::Approval(_) => "Approval",
            Self::ApprovalForAll(_) => "ApprovalForAll",
            Self::TokenUriUpdated(_) => "TokenURIUpdated",
            Self::TokenMetadataUriUpdated(_) => "TokenMetadataURIUpdated",
            Self::BidShareUpdated(_) => "BidShareUpdated",
            Self::AskCreated(_) => "AskCreated",
            Self::AskRemoved(_) => "AskRemoved",
            Self::BidCreated(_) => "BidCreated",
            Self::BidRemoved(_) => "BidRemoved",
            Self::BidFinalized(_) => "BidFinalized",
            Self::ReserveListingCreated(_) => "ReserveListingCreated",
            Self::ReserveListingApprovalUpdated(_) => "ReserveListingApprovalUpdated",
            Self::ReserveListingReservePriceUpdated(_) => "ReserveListingReservePriceUpdated",
            Self::ReserveListingBid(_) => "ReserveListingBid",
            Self::ReserveListingDurationExtended(_) => "ReserveListingDurationExtended",
            Self::ReserveListingEnded(_) => "ReserveListingEnded",
            Self::ReserveListingCanceled(_) => "ReserveListingCanceled",
        }
    }

    /// Token id for item and exchange events
    pub fn token_id(&self) -> Option<U256> {
        match self {
            Self::Transfer(p) => Some(p.token_id),
            Self::Approval(p) => Some(p.token_id),
            Self::TokenUriUpdated(p) | Self::TokenMetadataUriUpdated(p) => Some(p.token_id),
            Self::BidShareUpdated(p) => Some(p.token_id),
            Self::AskCreated(p) | Self::AskRemoved(p) => Some(p.token_id),
            Self::BidCreated(p) | Self::BidRemoved(p) | Self::BidFinalized(p) => Some(p.token_id),
            Self::ReserveListingCreated(p) => Some(p.token_id),
            _ => None,
        }
    }

    /// Listing id for auction house events
    pub fn listing_id(&self) -> Option<ListingId> {
        match self {
            Self::ReserveListingCreated(p) => Some(p.listing_id),
            Self::ReserveListingApprovalUpdated(p) => Some(p.listing_id),
            Self::ReserveListingReservePriceUpdated(p) => Some(p.listing_id),
            Self::ReserveListingBid(p) => Some(p.listing_id),
            Self::ReserveListingDurationExtended(p) => Some(p.listing_id),
            Self::ReserveListingEnded(p) => Some(p.listing_id),
            Self::ReserveListingCanceled(p) => Some(p.listing_id),
            _ => None,
        }
    }
}
