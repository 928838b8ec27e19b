//! Market lifecycle: asks and bids on items, with currency liquidity.
//!
//! Ask transitions (keyed by item and current owner):
//!
//! ```text
//! (none) --AskCreated--> live --AskCreated--> live'   archives InactiveAsk(Removed)
//!                         |
//!                         +----AskRemoved---> (none)  archives InactiveAsk(Removed)
//! ```
//!
//! Bid transitions (keyed by item and bidder):
//!
//! ```text
//! (none) --BidCreated--> live --BidRemoved----> (none)  archives InactiveBid(Removed)
//!                         |
//!                         +----BidFinalized--> (none)   archives InactiveBid(Finalized)
//! ```
//!
//! Every bid that becomes live credits its currency's liquidity; every bid
//! that stops being live releases it.

use alloy_primitives::Address;
use tracing::{debug, info, warn};

use super::{CurrencyCatalog, Diagnostics, IdentityResolver, LifecycleSettings};
use crate::error::{Error, Result};
use crate::events::{AskParams, BidParams, EventMeta};
use crate::metadata::CurrencyMetadataSource;
use crate::model::{
    Ask, AskId, Bid, BidId, InactiveAsk, InactiveBid, Item, ItemId, TerminationReason, Transfer,
};
use crate::storage::{EntityStore, StorageBackend};

/// Owns [`Ask`], [`Bid`] and their inactive snapshots
pub struct MarketLifecycle<'a, B: StorageBackend, C: CurrencyMetadataSource> {
    store: &'a EntityStore<B>,
    currencies: CurrencyCatalog<'a, B, C>,
    settings: LifecycleSettings,
}

impl<'a, B: StorageBackend, C: CurrencyMetadataSource> MarketLifecycle<'a, B, C> {
    /// Create the handler
    pub fn new(store: &'a EntityStore<B>, chain: &'a C, settings: LifecycleSettings) -> Self {
        Self {
            store,
            currencies: CurrencyCatalog::new(store, chain, settings.fallback_decimals),
            settings,
        }
    }

    fn load_item(&self, id: &ItemId, diagnostics: &mut Diagnostics) -> Result<Option<Item>> {
        let item = self.store.load::<Item>(id)?;
        if item.is_none() {
            diagnostics.missing(Error::ItemNotFound(id.to_string()))?;
        }
        Ok(item)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ASKS
    // ═══════════════════════════════════════════════════════════════════════════

    /// `AskCreated`: create the owner's ask, or archive and overwrite it
    pub fn ask_created(
        &self,
        meta: &EventMeta,
        id: ItemId,
        params: &AskParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        info!(
            token_id = %id.token_id,
            amount = %params.ask.amount,
            currency = %params.ask.currency,
            "Starting handler for AskCreated"
        );

        let Some(item) = self.load_item(&id, diagnostics)? else {
            return Ok(());
        };
        let currency = self.currencies.find_or_create_currency(params.ask.currency)?;
        let ask_id = AskId::new(id, item.owner);

        let ask = match self.store.load::<Ask>(&ask_id)? {
            None => Ask {
                id: ask_id,
                amount: params.ask.amount,
                currency: currency.id,
                transaction_hash: meta.tx_hash,
                created: meta.stamp(),
            },
            Some(mut live) => {
                self.archive_ask(meta, &live)?;
                live.amount = params.ask.amount;
                live.currency = currency.id;
                live.transaction_hash = meta.tx_hash;
                live.created = meta.stamp();
                live
            }
        };
        self.store.save(&ask)?;

        info!(token_id = %id.token_id, ask = %ask_id, "Completed handler for AskCreated");
        Ok(())
    }

    /// `AskRemoved`: archive and delete the owner's ask.
    ///
    /// A zero amount marks a malformed event and leaves state untouched.
    pub fn ask_removed(
        &self,
        meta: &EventMeta,
        id: ItemId,
        params: &AskParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        info!(token_id = %id.token_id, "Starting handler for AskRemoved");

        if params.ask.amount.is_zero() {
            info!(
                token_id = %id.token_id,
                "AskRemoved has a zero amount, not updating state"
            );
            return Ok(());
        }

        let Some(item) = self.load_item(&id, diagnostics)? else {
            return Ok(());
        };
        let ask_id = AskId::new(id, item.owner);
        let Some(live) = self.store.load::<Ask>(&ask_id)? else {
            diagnostics.missing(Error::AskNotFound(ask_id.to_string()))?;
            return Ok(());
        };

        self.archive_ask(meta, &live)?;
        self.store.remove::<Ask>(&ask_id)?;

        info!(token_id = %id.token_id, ask = %ask_id, "Completed handler for AskRemoved");
        Ok(())
    }

    fn archive_ask(&self, meta: &EventMeta, live: &Ask) -> Result<()> {
        let inactive = InactiveAsk {
            id: meta.log_id(live.item().token_id),
            item: live.item(),
            reason: TerminationReason::Removed,
            amount: live.amount,
            currency: live.currency,
            owner: live.owner(),
            transaction_hash: meta.tx_hash,
            created: live.created,
            inactivated: meta.stamp(),
        };
        debug!(inactive_ask = %inactive.id, amount = %inactive.amount, "Archived ask");
        self.store.save(&inactive)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BIDS
    // ═══════════════════════════════════════════════════════════════════════════

    /// `BidCreated`: make the bidder's bid live and credit liquidity.
    ///
    /// A live bid already on the key is archived as removed first, so the
    /// key never holds two bids and liquidity never counts both.
    pub fn bid_created(
        &self,
        meta: &EventMeta,
        id: ItemId,
        params: &BidParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let onchain = &params.bid;
        info!(
            token_id = %id.token_id,
            bidder = %onchain.bidder,
            amount = %onchain.amount,
            currency = %onchain.currency,
            "Starting handler for BidCreated"
        );

        // The bid is keyed without the item's state; keep it even if the
        // item is missing.
        self.load_item(&id, diagnostics)?;

        let users = IdentityResolver::new(self.store);
        users.find_or_create_user(onchain.bidder)?;
        users.find_or_create_user(onchain.recipient)?;
        let currency = self.currencies.find_or_create_currency(onchain.currency)?;

        let bid_id = BidId::new(id, onchain.bidder);
        if let Some(previous) = self.store.load::<Bid>(&bid_id)? {
            warn!(bid = %bid_id, "BidCreated over a live bid, archiving the previous one");
            self.archive_bid(meta, &previous, TerminationReason::Removed)?;
            self.currencies
                .release_liquidity(previous.currency, previous.amount, diagnostics)?;
        }

        let bid = Bid {
            id: bid_id,
            amount: onchain.amount,
            currency: currency.id,
            sell_on_share: onchain.sell_on_share,
            recipient: onchain.recipient,
            transaction_hash: meta.tx_hash,
            created: meta.stamp(),
        };
        self.store.save(&bid)?;
        let currency = self.currencies.credit_liquidity(bid.currency, bid.amount)?;

        info!(
            token_id = %id.token_id,
            bid = %bid_id,
            liquidity = %currency.liquidity,
            "Completed handler for BidCreated"
        );
        Ok(())
    }

    /// `BidRemoved`: archive and delete the bidder's bid, release liquidity
    pub fn bid_removed(
        &self,
        meta: &EventMeta,
        id: ItemId,
        params: &BidParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let bid_id = BidId::new(id, params.bid.bidder);
        info!(token_id = %id.token_id, bid = %bid_id, "Starting handler for BidRemoved");

        let Some(live) = self.store.load::<Bid>(&bid_id)? else {
            diagnostics.missing(Error::BidNotFound(bid_id.to_string()))?;
            return Ok(());
        };

        self.archive_bid(meta, &live, TerminationReason::Removed)?;
        self.store.remove::<Bid>(&bid_id)?;
        let currency = self
            .currencies
            .release_liquidity(live.currency, live.amount, diagnostics)?;

        info!(
            token_id = %id.token_id,
            bid = %bid_id,
            liquidity = %currency.liquidity,
            "Completed handler for BidRemoved"
        );
        Ok(())
    }

    /// `BidFinalized`: the bid was accepted and the item changed hands.
    ///
    /// The seller is read from the `Transfer` logged
    /// `finalize_transfer_offset` positions earlier in the same transaction.
    /// The archived snapshot comes from the event itself, stamped with the
    /// event's block for both creation and termination.
    pub fn bid_finalized(
        &self,
        meta: &EventMeta,
        id: ItemId,
        params: &BidParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let onchain = &params.bid;
        let bid_id = BidId::new(id, onchain.bidder);
        info!(token_id = %id.token_id, bid = %bid_id, "Starting handler for BidFinalized");

        let item = self.load_item(&id, diagnostics)?;

        let users = IdentityResolver::new(self.store);
        users.find_or_create_user(onchain.bidder)?;
        users.find_or_create_user(onchain.recipient)?;
        let currency = self.currencies.find_or_create_currency(onchain.currency)?;

        if let Some(seller) = self.correlated_seller(meta, id, diagnostics)? {
            if let Some(mut item) = item {
                item.prev_owner = seller;
                self.store.save(&item)?;
            }
        }

        let inactive = InactiveBid {
            id: meta.log_id(id.token_id),
            item: id,
            reason: TerminationReason::Finalized,
            amount: onchain.amount,
            currency: currency.id,
            sell_on_share: onchain.sell_on_share,
            bidder: onchain.bidder,
            recipient: onchain.recipient,
            transaction_hash: meta.tx_hash,
            created: meta.stamp(),
            inactivated: meta.stamp(),
        };
        self.store.save(&inactive)?;

        match self.store.load::<Bid>(&bid_id)? {
            Some(live) => {
                if live.amount != onchain.amount || live.currency != onchain.currency {
                    warn!(
                        bid = %bid_id,
                        live_amount = %live.amount,
                        finalized_amount = %onchain.amount,
                        "Finalized terms differ from the live bid"
                    );
                }
                self.store.remove::<Bid>(&bid_id)?;
                self.currencies
                    .release_liquidity(live.currency, live.amount, diagnostics)?;
            }
            None => {
                warn!(bid = %bid_id, "No live bid to finalize, liquidity unchanged");
            }
        }

        info!(token_id = %id.token_id, bid = %bid_id, "Completed handler for BidFinalized");
        Ok(())
    }

    /// `from` of the transfer this finalize settles, if it can be found
    fn correlated_seller(
        &self,
        meta: &EventMeta,
        id: ItemId,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Address>> {
        let here = meta.log_id(id.token_id);
        let Some(transfer_id) = here.earlier(self.settings.finalize_transfer_offset) else {
            diagnostics.missing(Error::TransferNotFound(format!(
                "{} (no log {} positions earlier)",
                here, self.settings.finalize_transfer_offset
            )))?;
            return Ok(None);
        };

        match self.store.load::<Transfer>(&transfer_id)? {
            Some(transfer) => Ok(Some(transfer.from)),
            None => {
                diagnostics.missing(Error::TransferNotFound(transfer_id.to_string()))?;
                Ok(None)
            }
        }
    }

    fn archive_bid(&self, meta: &EventMeta, live: &Bid, reason: TerminationReason) -> Result<()> {
        let inactive = InactiveBid {
            id: meta.log_id(live.item().token_id),
            item: live.item(),
            reason,
            amount: live.amount,
            currency: live.currency,
            sell_on_share: live.sell_on_share,
            bidder: live.bidder(),
            recipient: live.recipient,
            transaction_hash: meta.tx_hash,
            created: live.created,
            inactivated: meta.stamp(),
        };
        debug!(inactive_bid = %inactive.id, reason = ?reason, "Archived bid");
        self.store.save(&inactive)
    }
}
