//! Event parameter structs, one per event signature.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::model::{BidShares, ListingId};

/// `Transfer(from, to, tokenId)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferParams {
    /// Sender
    pub from: Address,
    /// Recipient
    pub to: Address,
    /// Token id
    pub token_id: U256,
}

/// `Approval(owner, approved, tokenId)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalParams {
    /// Token owner
    pub owner: Address,
    /// Approved operator (zero clears)
    pub approved: Address,
    /// Token id
    pub token_id: U256,
}

/// `ApprovalForAll(owner, operator, approved)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalForAllParams {
    /// Account granting approval
    pub owner: Address,
    /// Operator
    pub operator: Address,
    /// Granted or revoked
    pub approved: bool,
}

/// `TokenURIUpdated` / `TokenMetadataURIUpdated`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriUpdatedParams {
    /// Token id
    pub token_id: U256,
    /// Account performing the update
    pub owner: Address,
    /// New URI
    pub uri: String,
}

/// `BidShareUpdated(tokenId, bidShares)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidShareUpdatedParams {
    /// Token id
    pub token_id: U256,
    /// New shares
    pub bid_shares: BidShares,
}

/// On-chain ask struct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainAsk {
    /// Asking price
    pub amount: U256,
    /// Currency
    pub currency: Address,
}

/// `AskCreated(tokenId, ask)` / `AskRemoved(tokenId, ask)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskParams {
    /// Token id
    pub token_id: U256,
    /// Ask terms
    pub ask: OnChainAsk,
}

/// On-chain bid struct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainBid {
    /// Offered amount
    pub amount: U256,
    /// Currency
    pub currency: Address,
    /// Bidder
    pub bidder: Address,
    /// Recipient if accepted
    pub recipient: Address,
    /// Sell-on share
    pub sell_on_share: U256,
}

/// `BidCreated` / `BidRemoved` / `BidFinalized`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidParams {
    /// Token id
    pub token_id: U256,
    /// Bid terms
    pub bid: OnChainBid,
}

/// Reserve listing opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveListingCreatedParams {
    /// Listing id
    pub listing_id: ListingId,
    /// Token id
    pub token_id: U256,
    /// Token contract
    pub token_contract: Address,
    /// Earliest start time
    pub starts_at: u64,
    /// Duration from first bid, seconds
    pub duration: u64,
    /// Reserve price
    pub reserve_price: U256,
    /// Listing type
    pub list_type: u8,
    /// Token owner
    pub token_owner: Address,
    /// Curator / intermediary
    pub intermediary: Address,
    /// Intermediary fee percentage
    pub intermediary_fee_percentage: u8,
    /// Bid currency
    pub currency: Address,
}

/// Curator approval changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveListingApprovalParams {
    /// Listing id
    pub listing_id: ListingId,
    /// New approval state
    pub approved: bool,
}

/// Reserve price changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveListingPriceParams {
    /// Listing id
    pub listing_id: ListingId,
    /// New reserve price
    pub reserve_price: U256,
}

/// Bid placed on a reserve listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveListingBidParams {
    /// Listing id
    pub listing_id: ListingId,
    /// Bidder
    pub sender: Address,
    /// Bid amount
    pub value: U256,
    /// Auction house's own first-bid flag
    pub first_bid: bool,
    /// Whether this bid extended the listing
    pub extended: bool,
}

/// Listing duration extended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveListingDurationParams {
    /// Listing id
    pub listing_id: ListingId,
    /// New duration
    pub duration: u64,
}

/// Listing settled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveListingEndedParams {
    /// Listing id
    pub listing_id: ListingId,
    /// Winning bidder (zero when nobody bid)
    pub winner: Address,
    /// Winning amount
    pub amount: U256,
}

/// Listing canceled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveListingCanceledParams {
    /// Listing id
    pub listing_id: ListingId,
}
