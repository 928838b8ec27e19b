//! Shared fixtures for integration tests.

#![allow(dead_code)]

use alloy_primitives::{Address, B256, U256};

use motif_indexer::config::{ExchangePairing, IndexerConfig};
use motif_indexer::events::*;
use motif_indexer::metadata::fixture::{CurrencyRecord, TokenRecord};
use motif_indexer::metadata::StaticChain;
use motif_indexer::model::{BidShares, ItemId, ListingId};
use motif_indexer::router::EventRouter;
use motif_indexer::storage::{EntityStore, InMemoryStore, StorageBackend};

pub const ITEM_CONTRACT: Address = Address::repeat_byte(0x10);
pub const EXCHANGE: Address = Address::repeat_byte(0xe0);
pub const AUCTION_HOUSE: Address = Address::repeat_byte(0xa0);
pub const WETH: Address = Address::repeat_byte(0xcc);

pub const ALICE: Address = Address::repeat_byte(0x0a);
pub const BOB: Address = Address::repeat_byte(0x0b);
pub const CAROL: Address = Address::repeat_byte(0x0c);

pub fn config() -> IndexerConfig {
    IndexerConfig {
        item_contracts: vec![ITEM_CONTRACT],
        exchanges: vec![ExchangePairing {
            exchange: EXCHANGE,
            item_contract: ITEM_CONTRACT,
        }],
        auction_houses: vec![AUCTION_HOUSE],
        ..Default::default()
    }
}

/// Token 1 described, paired with [`EXCHANGE`], and WETH metadata available
pub fn chain() -> StaticChain {
    StaticChain::new()
        .with_exchange(ITEM_CONTRACT, EXCHANGE)
        .with_bid_shares(
            EXCHANGE,
            U256::from(1u64),
            BidShares {
                creator: U256::from(10u64),
                owner: U256::from(85u64),
                prev_owner: U256::from(5u64),
            },
        )
        .with_token(TokenRecord {
            contract: ITEM_CONTRACT,
            token_id: U256::from(1u64),
            content_uri: Some("ipfs://content".into()),
            metadata_uri: Some("ipfs://metadata".into()),
            content_hash: Some(B256::repeat_byte(0xc1)),
            metadata_hash: Some(B256::repeat_byte(0xd1)),
        })
        .with_currency(CurrencyRecord {
            address: WETH,
            name: Some("Wrapped Ether".into()),
            symbol: Some("WETH".into()),
            decimals: Some(18),
            ..Default::default()
        })
}

pub fn router_with<B: StorageBackend>(store: EntityStore<B>) -> EventRouter<B, StaticChain> {
    EventRouter::from_config(store, chain(), &config()).unwrap()
}

pub fn router() -> EventRouter<InMemoryStore, StaticChain> {
    router_with(EntityStore::new(InMemoryStore::new()))
}

pub fn item(token: u64) -> ItemId {
    ItemId::new(ITEM_CONTRACT, U256::from(token))
}

/// Event metadata at `block` (timestamp `block * 12`) in transaction `tx`
pub fn meta(emitter: Address, block: u64, tx: u8, log_index: u64) -> EventMeta {
    EventMeta {
        address: emitter,
        block_number: block,
        block_timestamp: block * 12,
        tx_hash: B256::repeat_byte(tx),
        log_index,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT BUILDERS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn transfer(meta: EventMeta, from: Address, to: Address, token: u64) -> MarketEvent {
    MarketEvent::new(
        meta,
        EventKind::Transfer(TransferParams {
            from,
            to,
            token_id: U256::from(token),
        }),
    )
}

pub fn mint(meta: EventMeta, to: Address, token: u64) -> MarketEvent {
    transfer(meta, Address::ZERO, to, token)
}

pub fn ask_created(meta: EventMeta, token: u64, amount: u64, currency: Address) -> MarketEvent {
    MarketEvent::new(meta, EventKind::AskCreated(ask_params(token, amount, currency)))
}

pub fn ask_removed(meta: EventMeta, token: u64, amount: u64, currency: Address) -> MarketEvent {
    MarketEvent::new(meta, EventKind::AskRemoved(ask_params(token, amount, currency)))
}

fn ask_params(token: u64, amount: u64, currency: Address) -> AskParams {
    AskParams {
        token_id: U256::from(token),
        ask: OnChainAsk {
            amount: U256::from(amount),
            currency,
        },
    }
}

pub fn bid_params(token: u64, bidder: Address, amount: u64, currency: Address) -> BidParams {
    BidParams {
        token_id: U256::from(token),
        bid: OnChainBid {
            amount: U256::from(amount),
            currency,
            bidder,
            recipient: bidder,
            sell_on_share: U256::ZERO,
        },
    }
}

pub fn bid_created(meta: EventMeta, token: u64, bidder: Address, amount: u64) -> MarketEvent {
    MarketEvent::new(
        meta,
        EventKind::BidCreated(bid_params(token, bidder, amount, WETH)),
    )
}

pub fn bid_removed(meta: EventMeta, token: u64, bidder: Address, amount: u64) -> MarketEvent {
    MarketEvent::new(
        meta,
        EventKind::BidRemoved(bid_params(token, bidder, amount, WETH)),
    )
}

pub fn bid_finalized(meta: EventMeta, token: u64, bidder: Address, amount: u64) -> MarketEvent {
    MarketEvent::new(
        meta,
        EventKind::BidFinalized(bid_params(token, bidder, amount, WETH)),
    )
}

pub fn listing_created(meta: EventMeta, listing: u64, token: u64, owner: Address) -> MarketEvent {
    MarketEvent::new(
        meta,
        EventKind::ReserveListingCreated(ReserveListingCreatedParams {
            listing_id: ListingId::from_u64(listing),
            token_id: U256::from(token),
            token_contract: ITEM_CONTRACT,
            starts_at: 0,
            duration: 86_400,
            reserve_price: U256::from(1_000u64),
            list_type: 0,
            token_owner: owner,
            intermediary: CAROL,
            intermediary_fee_percentage: 5,
            currency: WETH,
        }),
    )
}

pub fn reserve_bid(
    meta: EventMeta,
    listing: u64,
    sender: Address,
    value: u64,
    first_bid: bool,
) -> MarketEvent {
    MarketEvent::new(
        meta,
        EventKind::ReserveListingBid(ReserveListingBidParams {
            listing_id: ListingId::from_u64(listing),
            sender,
            value: U256::from(value),
            first_bid,
            extended: false,
        }),
    )
}

pub fn listing_ended(meta: EventMeta, listing: u64, winner: Address, amount: u64) -> MarketEvent {
    MarketEvent::new(
        meta,
        EventKind::ReserveListingEnded(ReserveListingEndedParams {
            listing_id: ListingId::from_u64(listing),
            winner,
            amount: U256::from(amount),
        }),
    )
}
