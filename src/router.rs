//! Event router.
//!
//! Checks each event's emitter against the allow-list, resolves the routing
//! key, and hands the event to the lifecycle that owns it. Events are
//! processed one at a time, each to completion, in the order supplied.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

use crate::config::{AllowList, IndexerConfig};
use crate::error::{Error, Result};
use crate::events::{EventClass, EventKind, MarketEvent};
use crate::lifecycle::{
    AuctionLifecycle, Diagnostics, ItemLifecycle, LifecycleSettings, MarketLifecycle,
};
use crate::metadata::ChainReader;
use crate::model::{ItemId, UriKind};
use crate::storage::{EntityStore, StorageBackend};

// ═══════════════════════════════════════════════════════════════════════════════
// OUTCOMES AND STATISTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of processing one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Applied cleanly
    Applied,
    /// Emitter not allow-listed for the event's class
    Skipped,
    /// Applied best-effort; these problems were reported
    Degraded(Vec<Error>),
}

impl ProcessOutcome {
    /// True unless the event was skipped
    pub fn was_applied(&self) -> bool {
        !matches!(self, ProcessOutcome::Skipped)
    }
}

/// Counters kept by the router
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerStatistics {
    /// Events handed to the router
    pub total_events: u64,
    /// Events applied without problems
    pub applied: u64,
    /// Events skipped by the allow-list
    pub skipped: u64,
    /// Events applied with reported problems
    pub degraded: u64,
    /// Reported problems across all events
    pub reported_errors: u64,
    /// Routed events by type
    pub events_by_type: BTreeMap<String, u64>,
    /// Highest block seen
    pub latest_block: u64,
}

impl IndexerStatistics {
    fn record(&mut self, event: &MarketEvent, outcome: &ProcessOutcome) {
        self.total_events += 1;
        self.latest_block = self.latest_block.max(event.meta.block_number);

        match outcome {
            ProcessOutcome::Skipped => {
                self.skipped += 1;
                return;
            }
            ProcessOutcome::Applied => self.applied += 1,
            ProcessOutcome::Degraded(errors) => {
                self.degraded += 1;
                self.reported_errors += errors.len() as u64;
            }
        }

        *self
            .events_by_type
            .entry(event.kind.name().to_string())
            .or_insert(0) += 1;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT ROUTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Dispatches decoded events to the lifecycle handlers
pub struct EventRouter<B: StorageBackend, C: ChainReader> {
    store: EntityStore<B>,
    chain: C,
    allow_list: AllowList,
    settings: LifecycleSettings,
    stats: IndexerStatistics,
}

impl<B: StorageBackend, C: ChainReader> EventRouter<B, C> {
    /// Create a router
    pub fn new(
        store: EntityStore<B>,
        chain: C,
        allow_list: AllowList,
        settings: LifecycleSettings,
    ) -> Self {
        if allow_list.is_empty() {
            info!("Allow-list is empty, every event will be skipped");
        }

        Self {
            store,
            chain,
            allow_list,
            settings,
            stats: IndexerStatistics::default(),
        }
    }

    /// Create a router from a validated configuration
    pub fn from_config(store: EntityStore<B>, chain: C, config: &IndexerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            store,
            chain,
            config.allow_list(),
            config.lifecycle_settings(),
        ))
    }

    /// Entity store
    pub fn store(&self) -> &EntityStore<B> {
        &self.store
    }

    /// Chain reader
    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// Allow-list in force
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Counters so far
    pub fn statistics(&self) -> &IndexerStatistics {
        &self.stats
    }

    /// Give back the store
    pub fn into_store(self) -> EntityStore<B> {
        self.store
    }

    /// Process a batch in order, stopping at the first hard error
    pub fn process_all<'e, I>(&mut self, events: I) -> Result<&IndexerStatistics>
    where
        I: IntoIterator<Item = &'e MarketEvent>,
    {
        for event in events {
            self.process(event)?;
        }
        self.store.flush()?;
        Ok(&self.stats)
    }

    /// Process one event to completion
    pub fn process(&mut self, event: &MarketEvent) -> Result<ProcessOutcome> {
        let outcome = match self.apply(event) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    event = event.kind.name(),
                    block = event.meta.block_number,
                    log_index = event.meta.log_index,
                    code = err.code(),
                    "Event failed: {}",
                    err
                );
                return Err(err);
            }
        };

        self.stats.record(event, &outcome);
        Ok(outcome)
    }

    fn apply(&self, event: &MarketEvent) -> Result<ProcessOutcome> {
        let meta = &event.meta;
        let class = event.kind.class();

        if !self.allow_list.allows(class, &meta.address) {
            info!(
                event = event.kind.name(),
                contract = %meta.address,
                "Contract is not a recognized {:?} source, not proceeding",
                class
            );
            return Ok(ProcessOutcome::Skipped);
        }

        debug!(
            event = event.kind.name(),
            block = meta.block_number,
            log_index = meta.log_index,
            "Routing event"
        );

        let mut diagnostics = Diagnostics::new(self.settings.missing_referent_policy);
        let items = ItemLifecycle::new(&self.store, &self.chain);
        let market = MarketLifecycle::new(&self.store, &self.chain, self.settings);
        let auctions = AuctionLifecycle::new(&self.store, &self.chain, self.settings);
        let d = &mut diagnostics;

        match &event.kind {
            // Item contract
            EventKind::Transfer(p) => items.transfer(meta, self.item_id(event, p.token_id)?, p, d)?,
            EventKind::Approval(p) => items.approval(self.item_id(event, p.token_id)?, p, d)?,
            EventKind::ApprovalForAll(p) => items.approval_for_all(p)?,
            EventKind::TokenUriUpdated(p) => items.uri_updated(
                meta,
                self.item_id(event, p.token_id)?,
                UriKind::Content,
                p,
                d,
            )?,
            EventKind::TokenMetadataUriUpdated(p) => items.uri_updated(
                meta,
                self.item_id(event, p.token_id)?,
                UriKind::Metadata,
                p,
                d,
            )?,

            // Exchange
            EventKind::BidShareUpdated(p) => {
                items.bid_share_updated(self.item_id(event, p.token_id)?, p, d)?
            }
            EventKind::AskCreated(p) => {
                market.ask_created(meta, self.item_id(event, p.token_id)?, p, d)?
            }
            EventKind::AskRemoved(p) => {
                market.ask_removed(meta, self.item_id(event, p.token_id)?, p, d)?
            }
            EventKind::BidCreated(p) => {
                market.bid_created(meta, self.item_id(event, p.token_id)?, p, d)?
            }
            EventKind::BidRemoved(p) => {
                market.bid_removed(meta, self.item_id(event, p.token_id)?, p, d)?
            }
            EventKind::BidFinalized(p) => {
                market.bid_finalized(meta, self.item_id(event, p.token_id)?, p, d)?
            }

            // Auction house
            EventKind::ReserveListingCreated(p) => auctions.listing_created(meta, p)?,
            EventKind::ReserveListingApprovalUpdated(p) => auctions.approval_updated(meta, p, d)?,
            EventKind::ReserveListingReservePriceUpdated(p) => {
                auctions.reserve_price_updated(p, d)?
            }
            EventKind::ReserveListingBid(p) => auctions.bid_placed(meta, p, d)?,
            EventKind::ReserveListingDurationExtended(p) => auctions.duration_extended(p, d)?,
            EventKind::ReserveListingEnded(p) => auctions.listing_ended(meta, p, d)?,
            EventKind::ReserveListingCanceled(p) => auctions.listing_canceled(meta, p, d)?,
        }

        Ok(if diagnostics.is_clean() {
            ProcessOutcome::Applied
        } else {
            ProcessOutcome::Degraded(diagnostics.into_errors())
        })
    }

    /// `(item contract, token id)` for an item or exchange event
    fn item_id(&self, event: &MarketEvent, token_id: U256) -> Result<ItemId> {
        let emitter = event.meta.address;
        let contract = match event.kind.class() {
            EventClass::ItemContract => emitter,
            EventClass::Exchange => {
                self.allow_list
                    .paired_item_contract(&emitter)
                    .ok_or_else(|| {
                        Error::Internal(format!(
                            "exchange 0x{} has no paired item contract",
                            hex::encode(emitter)
                        ))
                    })?
            }
            EventClass::AuctionHouse => {
                return Err(Error::Internal(format!(
                    "{} is not routed by item",
                    event.kind.name()
                )))
            }
        };
        Ok(ItemId::new(contract, token_id))
    }
}
