//! # Motif Indexer
//!
//! Event-to-state core of an NFT marketplace indexer. It consumes decoded
//! contract events in canonical chain order and maintains items, users,
//! currencies, asks, bids and reserve auctions, plus an append-only history
//! of every transfer, URI change and terminated order.
//!
//! ## Architecture
//!
//! - **Events**: Typed events as delivered by the upstream decoder
//! - **Router**: Allow-list check, routing key resolution, dispatch
//! - **Lifecycle**: Item, market (ask/bid) and auction state machines
//! - **Metadata**: Read-only contract calls (token URIs, ERC-20 metadata)
//! - **Storage**: Typed load/save/remove over pluggable backends
//!
//! ## Example
//!
//! ```rust,ignore
//! use motif_indexer::prelude::*;
//!
//! let store = EntityStore::new(InMemoryStore::new());
//! let mut router = EventRouter::from_config(store, StaticChain::new(), &config)?;
//!
//! for event in events {
//!     router.process(&event)?;
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod metadata;
pub mod model;
pub mod router;
pub mod storage;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{AllowList, IndexerConfig, MissingReferentPolicy};
    pub use crate::error::{Error, Result};
    pub use crate::events::{EventClass, EventKind, EventMeta, MarketEvent};
    pub use crate::lifecycle::{Diagnostics, LifecycleSettings};
    pub use crate::metadata::{ChainReader, StaticChain};
    pub use crate::model::{
        Ask, Bid, Currency, InactiveAsk, InactiveBid, InactiveReserveListingBid, Item, ItemId,
        ListingId, ReserveListing, ReserveListingBid, Transfer, User,
    };
    pub use crate::router::{EventRouter, IndexerStatistics, ProcessOutcome};
    pub use crate::storage::{
        EntityKind, EntityStore, InMemoryStore, SnapshotFormat, SnapshotStore, StorageBackend,
    };
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Indexer name
pub const INDEXER_NAME: &str = "motif-indexer";
