//! Reserve auction lifecycle.
//!
//! ```text
//! Active --ReserveListingEnded (with bid)----> Finished
//!   |  \--ReserveListingEnded (no bid)-------> Canceled
//!   \----ReserveListingCanceled--------------> Canceled
//! ```
//!
//! A listing holds at most one live bid. Replacing or settling it archives
//! the live record under the same id before anything new is attached.

use tracing::{debug, info, warn};

use super::{CurrencyCatalog, Diagnostics, IdentityResolver, LifecycleSettings};
use crate::error::{Error, Result};
use crate::events::{
    EventMeta, ReserveListingApprovalParams, ReserveListingBidParams,
    ReserveListingCanceledParams, ReserveListingCreatedParams, ReserveListingDurationParams,
    ReserveListingEndedParams, ReserveListingPriceParams,
};
use crate::metadata::CurrencyMetadataSource;
use crate::model::{
    InactiveReserveListingBid, Item, ItemId, ListingId, ListingStatus, ReserveBidId,
    ReserveBidTermination, ReserveListing, ReserveListingBid,
};
use crate::storage::{EntityStore, StorageBackend};

/// Owns [`ReserveListing`] and its bids
pub struct AuctionLifecycle<'a, B: StorageBackend, C: CurrencyMetadataSource> {
    store: &'a EntityStore<B>,
    currencies: CurrencyCatalog<'a, B, C>,
}

impl<'a, B: StorageBackend, C: CurrencyMetadataSource> AuctionLifecycle<'a, B, C> {
    /// Create the handler
    pub fn new(store: &'a EntityStore<B>, chain: &'a C, settings: LifecycleSettings) -> Self {
        Self {
            store,
            currencies: CurrencyCatalog::new(store, chain, settings.fallback_decimals),
        }
    }

    /// Load a listing that must exist and still be open
    fn load_active(
        &self,
        id: ListingId,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<ReserveListing>> {
        let Some(listing) = self.store.load::<ReserveListing>(&id)? else {
            diagnostics.missing(Error::ReserveListingNotFound(id.to_string()))?;
            return Ok(None);
        };

        if listing.status.is_terminal() {
            diagnostics.violation(Error::InvariantViolation(format!(
                "listing {} is already {:?}",
                id, listing.status
            )));
            return Ok(None);
        }

        Ok(Some(listing))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LISTING SETUP
    // ═══════════════════════════════════════════════════════════════════════════

    /// Open a listing
    pub fn listing_created(
        &self,
        meta: &EventMeta,
        params: &ReserveListingCreatedParams,
    ) -> Result<()> {
        info!(
            listing_id = %params.listing_id,
            token_id = %params.token_id,
            "Starting handler for ReserveListingCreated"
        );

        let token = ItemId::new(params.token_contract, params.token_id);
        // listings may reference tokens that were never indexed
        let item = self.store.load::<Item>(&token)?.map(|item| item.id);
        if item.is_none() {
            debug!(token = %token, "Listing references an unindexed token");
        }

        let users = IdentityResolver::new(self.store);
        users.find_or_create_user(params.token_owner)?;
        users.find_or_create_user(params.intermediary)?;
        let currency = self.currencies.find_or_create_currency(params.currency)?;

        if self.store.exists::<ReserveListing>(&params.listing_id)? {
            warn!(listing_id = %params.listing_id, "Listing created twice, overwriting");
        }

        let listing = ReserveListing {
            id: params.listing_id,
            token,
            item,
            transaction_hash: meta.tx_hash,
            approved: true,
            approved_timestamp: Some(meta.block_timestamp),
            status: ListingStatus::Active,
            starts_at: params.starts_at,
            duration: params.duration,
            first_bid_time: 0,
            expected_end_timestamp: None,
            reserve_price: params.reserve_price,
            list_type: params.list_type,
            intermediary_fee_percentage: params.intermediary_fee_percentage,
            current_bid: None,
            token_owner: params.token_owner,
            intermediary: params.intermediary,
            currency: currency.id,
            created: meta.stamp(),
            finalized: None,
        };
        self.store.save(&listing)?;

        info!(listing_id = %params.listing_id, "Completed handler for ReserveListingCreated");
        Ok(())
    }

    /// Curator approval granted or withdrawn
    pub fn approval_updated(
        &self,
        meta: &EventMeta,
        params: &ReserveListingApprovalParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let Some(mut listing) = self.load_active(params.listing_id, diagnostics)? else {
            return Ok(());
        };

        listing.approved = params.approved;
        if params.approved {
            listing.approved_timestamp = Some(meta.block_timestamp);
        }
        self.store.save(&listing)?;

        info!(
            listing_id = %params.listing_id,
            approved = params.approved,
            "Updated listing approval"
        );
        Ok(())
    }

    /// Reserve price changed
    pub fn reserve_price_updated(
        &self,
        params: &ReserveListingPriceParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let Some(mut listing) = self.load_active(params.listing_id, diagnostics)? else {
            return Ok(());
        };

        listing.reserve_price = params.reserve_price;
        self.store.save(&listing)?;

        info!(
            listing_id = %params.listing_id,
            reserve_price = %params.reserve_price,
            "Updated reserve price"
        );
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BIDDING
    // ═══════════════════════════════════════════════════════════════════════════

    /// A bid was placed: start the clock on the first one, otherwise refund
    /// the bid it outbids
    pub fn bid_placed(
        &self,
        meta: &EventMeta,
        params: &ReserveListingBidParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        info!(
            listing_id = %params.listing_id,
            bidder = %params.sender,
            amount = %params.value,
            "Starting handler for ReserveListingBid"
        );

        let Some(mut listing) = self.load_active(params.listing_id, diagnostics)? else {
            return Ok(());
        };
        IdentityResolver::new(self.store).find_or_create_user(params.sender)?;

        if listing.current_bid.is_none() {
            if !params.first_bid {
                warn!(listing_id = %listing.id, "First indexed bid is not flagged as first");
            }
            listing.start_clock(meta.block_timestamp);
        } else {
            self.retire_current_bid(&mut listing, ReserveBidTermination::Refunded, meta, diagnostics)?;
        }

        let bid = ReserveListingBid {
            id: ReserveBidId::new(listing.id, meta.tx_hash, meta.log_index),
            listing: listing.id,
            amount: params.value,
            bidder: params.sender,
            transaction_hash: meta.tx_hash,
            created: meta.stamp(),
        };
        self.store.save(&bid)?;
        listing.current_bid = Some(bid.id);
        self.store.save(&listing)?;

        info!(
            listing_id = %listing.id,
            bid = %bid.id,
            extended = params.extended,
            "Completed handler for ReserveListingBid"
        );
        Ok(())
    }

    /// Duration extended by a late bid
    pub fn duration_extended(
        &self,
        params: &ReserveListingDurationParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let Some(mut listing) = self.load_active(params.listing_id, diagnostics)? else {
            return Ok(());
        };

        listing.extend(params.duration);
        self.store.save(&listing)?;

        info!(
            listing_id = %params.listing_id,
            duration = params.duration,
            expected_end = ?listing.expected_end_timestamp,
            "Extended listing"
        );
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SETTLEMENT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Settle a listing: the live bid wins, or the listing closes unsold
    pub fn listing_ended(
        &self,
        meta: &EventMeta,
        params: &ReserveListingEndedParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        info!(listing_id = %params.listing_id, "Starting handler for ReserveListingEnded");

        let Some(mut listing) = self.load_active(params.listing_id, diagnostics)? else {
            return Ok(());
        };

        let status = if listing.current_bid.is_some() {
            self.retire_current_bid(&mut listing, ReserveBidTermination::Final, meta, diagnostics)?;
            ListingStatus::Finished
        } else {
            ListingStatus::Canceled
        };
        self.finish(&mut listing, status, meta)?;

        info!(
            listing_id = %params.listing_id,
            status = ?status,
            winner = %params.winner,
            "Completed handler for ReserveListingEnded"
        );
        Ok(())
    }

    /// The token owner withdrew the listing
    pub fn listing_canceled(
        &self,
        meta: &EventMeta,
        params: &ReserveListingCanceledParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let Some(mut listing) = self.load_active(params.listing_id, diagnostics)? else {
            return Ok(());
        };

        if listing.current_bid.is_some() {
            warn!(listing_id = %listing.id, "Canceling a listing with a live bid");
            self.retire_current_bid(&mut listing, ReserveBidTermination::Refunded, meta, diagnostics)?;
        }
        self.finish(&mut listing, ListingStatus::Canceled, meta)?;

        info!(listing_id = %params.listing_id, "Canceled listing");
        Ok(())
    }

    fn finish(
        &self,
        listing: &mut ReserveListing,
        status: ListingStatus,
        meta: &EventMeta,
    ) -> Result<()> {
        listing.status = status;
        listing.finalized = Some(meta.stamp());
        self.store.save(&*listing)
    }

    /// Archive the live bid under its own id and detach it from the listing
    fn retire_current_bid(
        &self,
        listing: &mut ReserveListing,
        reason: ReserveBidTermination,
        meta: &EventMeta,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let Some(bid_id) = listing.current_bid.take() else {
            return Ok(());
        };

        let Some(live) = self.store.load::<ReserveListingBid>(&bid_id)? else {
            return diagnostics.missing(Error::ReserveListingBidNotFound(bid_id.to_string()));
        };

        let inactive = InactiveReserveListingBid::archive(&live, reason, meta.stamp());
        self.store.save(&inactive)?;
        self.store.remove::<ReserveListingBid>(&bid_id)?;

        debug!(bid = %bid_id, reason = ?reason, "Archived reserve listing bid");
        Ok(())
    }
}
