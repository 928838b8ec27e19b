//! Shared fixtures for handler unit tests.

use alloy_primitives::{Address, B256, U256};

use crate::events::EventMeta;
use crate::metadata::fixture::TokenRecord;
use crate::metadata::StaticChain;
use crate::model::{BidShares, ItemId};
use crate::storage::{EntityStore, InMemoryStore};

pub const ITEM_CONTRACT: Address = Address::repeat_byte(0x10);
pub const EXCHANGE: Address = Address::repeat_byte(0xe0);
pub const AUCTION_HOUSE: Address = Address::repeat_byte(0xa0);

pub fn store() -> EntityStore<InMemoryStore> {
    EntityStore::new(InMemoryStore::new())
}

pub fn item_id(token: u64) -> ItemId {
    ItemId::new(ITEM_CONTRACT, U256::from(token))
}

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// Event at `block` (timestamp `block * 10`) in transaction `tx`
pub fn meta(emitter: Address, block: u64, tx: u8, log_index: u64) -> EventMeta {
    EventMeta {
        address: emitter,
        block_number: block,
        block_timestamp: block * 10,
        tx_hash: B256::repeat_byte(tx),
        log_index,
    }
}

/// Chain with token 1 fully described and paired with [`EXCHANGE`]
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
}
