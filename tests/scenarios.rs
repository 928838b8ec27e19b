//! End-to-end scenarios through the event router.
//!
//! Each test feeds a short, chain-ordered event sequence and checks the
//! resulting store.

mod common;

use alloy_primitives::{Address, B256, U256};

use common::*;
use motif_indexer::config::MissingReferentPolicy;
use motif_indexer::error::Error;
use motif_indexer::events::{EventKind, MarketEvent, ReserveListingCanceledParams, UriUpdatedParams};
use motif_indexer::model::*;
use motif_indexer::router::{EventRouter, ProcessOutcome};
use motif_indexer::storage::{EntityKind, EntityStore, InMemoryStore};

fn liquidity<C>(router: &EventRouter<InMemoryStore, C>, currency: Address) -> U256
where
    C: motif_indexer::metadata::ChainReader,
{
    router
        .store()
        .load::<Currency>(&currency)
        .unwrap()
        .map(|c| c.liquidity)
        .unwrap_or_default()
}

fn minted_router() -> EventRouter<InMemoryStore, motif_indexer::metadata::StaticChain> {
    let mut router = router();
    let outcome = router
        .process(&mint(meta(ITEM_CONTRACT, 1, 0x01, 0), ALICE, 1))
        .unwrap();
    assert_eq!(outcome, ProcessOutcome::Applied);
    router
}

// ═══════════════════════════════════════════════════════════════════════════════
// ITEM SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_mint_creates_item_and_transfer() {
    let router = minted_router();
    let store = router.store();

    let item = store.load::<Item>(&item(1)).unwrap().unwrap();
    assert_eq!(item.owner, ALICE);
    assert_eq!(item.creator, ALICE);
    assert_eq!(item.prev_owner, ALICE);
    assert_eq!(item.content_uri, "ipfs://content");
    assert_eq!(item.metadata_uri, "ipfs://metadata");
    assert_eq!(item.content_hash, B256::repeat_byte(0xc1));
    assert_eq!(item.exchange_contract, Some(EXCHANGE));
    assert_eq!(item.bid_shares.unwrap().owner, U256::from(85u64));
    assert_eq!(item.created, BlockStamp::new(12, 1));

    let transfers = store.load_all::<Transfer>().unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].from, Address::ZERO);
    assert_eq!(transfers[0].to, ALICE);
    assert_eq!(transfers[0].item, item.id);

    assert!(store.exists::<User>(&ALICE).unwrap());
    assert!(store.exists::<User>(&Address::ZERO).unwrap());
}

#[test]
fn test_mint_of_undescribed_token_degrades_to_empty_metadata() {
    let mut router = router();
    let outcome = router
        .process(&mint(meta(ITEM_CONTRACT, 1, 0x01, 0), ALICE, 2))
        .unwrap();
    assert_eq!(outcome, ProcessOutcome::Applied);

    let item = router.store().load::<Item>(&item(2)).unwrap().unwrap();
    assert_eq!(item.content_uri, "");
    assert_eq!(item.content_hash, B256::ZERO);
    assert!(item.bid_shares.is_none());
    assert_eq!(item.exchange_contract, Some(EXCHANGE));
}

#[test]
fn test_transfer_then_burn() {
    let mut router = minted_router();
    router
        .process(&transfer(meta(ITEM_CONTRACT, 2, 0x02, 0), ALICE, BOB, 1))
        .unwrap();

    let token = router.store().load::<Item>(&item(1)).unwrap().unwrap();
    assert_eq!(token.owner, BOB);
    assert!(!token.is_burned());

    router
        .process(&transfer(meta(ITEM_CONTRACT, 3, 0x03, 0), BOB, Address::ZERO, 1))
        .unwrap();

    let token = router.store().load::<Item>(&item(1)).unwrap().unwrap();
    assert_eq!(token.owner, Address::ZERO);
    assert_eq!(token.prev_owner, Address::ZERO);
    assert_eq!(token.burned, Some(BlockStamp::new(36, 3)));
    assert_eq!(router.store().count(EntityKind::Transfer).unwrap(), 3);
}

#[test]
fn test_uri_update_keeps_history() {
    let mut router = minted_router();
    let event = MarketEvent::new(
        meta(ITEM_CONTRACT, 2, 0x02, 0),
        EventKind::TokenUriUpdated(UriUpdatedParams {
            token_id: U256::from(1u64),
            owner: ALICE,
            uri: "ipfs://content-v2".into(),
        }),
    );
    router.process(&event).unwrap();

    let item = router.store().load::<Item>(&item(1)).unwrap().unwrap();
    assert_eq!(item.content_uri, "ipfs://content-v2");

    let updates = router.store().load_all::<UriUpdate>().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].kind, UriKind::Content);
    assert_eq!(updates[0].from, "ipfs://content");
    assert_eq!(updates[0].to, "ipfs://content-v2");
}

// ═══════════════════════════════════════════════════════════════════════════════
// MARKET SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_ask_replacement_archives_previous_ask() {
    let mut router = minted_router();
    router
        .process(&ask_created(meta(EXCHANGE, 2, 0x02, 0), 1, 100, WETH))
        .unwrap();
    router
        .process(&ask_created(meta(EXCHANGE, 3, 0x03, 0), 1, 150, WETH))
        .unwrap();

    let store = router.store();
    let inactive = store.load_all::<InactiveAsk>().unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].amount, U256::from(100u64));
    assert_eq!(inactive[0].reason, TerminationReason::Removed);
    assert_eq!(inactive[0].created, BlockStamp::new(24, 2));
    assert_eq!(inactive[0].inactivated, BlockStamp::new(36, 3));

    let asks = store.load_all::<Ask>().unwrap();
    assert_eq!(asks.len(), 1);
    assert_eq!(asks[0].id, AskId::new(item(1), ALICE));
    assert_eq!(asks[0].amount, U256::from(150u64));
}

#[test]
fn test_ask_removed_with_zero_amount_changes_nothing() {
    let mut router = minted_router();
    router
        .process(&ask_created(meta(EXCHANGE, 2, 0x02, 0), 1, 100, WETH))
        .unwrap();
    let before = router.store().backend().len().unwrap();

    let outcome = router
        .process(&ask_removed(meta(EXCHANGE, 3, 0x03, 0), 1, 0, WETH))
        .unwrap();

    assert_eq!(outcome, ProcessOutcome::Applied);
    assert_eq!(router.store().backend().len().unwrap(), before);
    assert_eq!(router.store().count(EntityKind::InactiveAsk).unwrap(), 0);
    assert_eq!(router.store().count(EntityKind::Ask).unwrap(), 1);
}

#[test]
fn test_bid_create_and_remove_move_liquidity() {
    let mut router = minted_router();
    router
        .process(&bid_created(meta(EXCHANGE, 2, 0x02, 0), 1, BOB, 50))
        .unwrap();
    assert_eq!(liquidity(&router, WETH), U256::from(50u64));

    let currency = router.store().load::<Currency>(&WETH).unwrap().unwrap();
    assert_eq!(currency.symbol, "WETH");
    assert_eq!(currency.decimals, Some(18));

    router
        .process(&bid_removed(meta(EXCHANGE, 3, 0x03, 0), 1, BOB, 50))
        .unwrap();
    assert_eq!(liquidity(&router, WETH), U256::ZERO);
    assert!(!router
        .store()
        .exists::<Bid>(&BidId::new(item(1), BOB))
        .unwrap());

    let inactive = router.store().load_all::<InactiveBid>().unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].reason, TerminationReason::Removed);
    assert_eq!(inactive[0].amount, U256::from(50u64));
}

#[test]
fn test_accepted_sale_settles_bid_and_records_seller() {
    let mut router = minted_router();
    router
        .process(&bid_created(meta(EXCHANGE, 2, 0x02, 0), 1, BOB, 70))
        .unwrap();

    // settlement: transfer at log 4, finalize two positions later
    let settlement = vec![
        transfer(meta(ITEM_CONTRACT, 5, 0x05, 4), ALICE, BOB, 1),
        bid_finalized(meta(EXCHANGE, 5, 0x05, 6), 1, BOB, 70),
    ];
    router.process_all(&settlement).unwrap();

    let item = router.store().load::<Item>(&item(1)).unwrap().unwrap();
    assert_eq!(item.owner, BOB);
    assert_eq!(item.prev_owner, ALICE);

    assert_eq!(liquidity(&router, WETH), U256::ZERO);
    assert_eq!(router.store().count(EntityKind::Bid).unwrap(), 0);

    let inactive = router.store().load_all::<InactiveBid>().unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].reason, TerminationReason::Finalized);
    assert_eq!(inactive[0].created, BlockStamp::new(60, 5));
    assert_eq!(inactive[0].inactivated, BlockStamp::new(60, 5));
}

#[test]
fn test_finalize_without_transfer_is_reported_and_processing_continues() {
    let mut router = minted_router();
    router
        .process(&bid_created(meta(EXCHANGE, 2, 0x02, 0), 1, BOB, 70))
        .unwrap();

    let outcome = router
        .process(&bid_finalized(meta(EXCHANGE, 3, 0x03, 6), 1, BOB, 70))
        .unwrap();
    match outcome {
        ProcessOutcome::Degraded(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(matches!(errors[0], Error::TransferNotFound(_)));
        }
        other => panic!("expected a reported error, got {:?}", other),
    }

    // bid still settled
    assert_eq!(liquidity(&router, WETH), U256::ZERO);
    assert_eq!(router.store().count(EntityKind::InactiveBid).unwrap(), 1);

    // later events are unaffected
    let outcome = router
        .process(&bid_created(meta(EXCHANGE, 4, 0x04, 0), 1, CAROL, 30))
        .unwrap();
    assert_eq!(outcome, ProcessOutcome::Applied);
    assert_eq!(liquidity(&router, WETH), U256::from(30u64));
    assert_eq!(router.statistics().degraded, 1);
}

#[test]
fn test_fail_policy_propagates_missing_referents() {
    let mut config = config();
    config.missing_referent_policy = MissingReferentPolicy::Fail;
    let mut router = EventRouter::from_config(
        EntityStore::new(InMemoryStore::new()),
        chain(),
        &config,
    )
    .unwrap();

    let err = router
        .process(&bid_removed(meta(EXCHANGE, 1, 0x01, 0), 1, BOB, 50))
        .unwrap_err();
    assert!(matches!(err, Error::BidNotFound(_)));
    assert!(err.is_missing_referent());
}

#[test]
fn test_events_from_unlisted_contracts_are_ignored() {
    let mut router = router();
    let stray = Address::repeat_byte(0x77);

    let outcome = router.process(&mint(meta(stray, 1, 0x01, 0), ALICE, 1)).unwrap();
    assert_eq!(outcome, ProcessOutcome::Skipped);

    let outcome = router
        .process(&bid_created(meta(stray, 2, 0x02, 0), 1, BOB, 50))
        .unwrap();
    assert_eq!(outcome, ProcessOutcome::Skipped);

    assert!(router.store().backend().is_empty().unwrap());
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUCTION SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_outbid_reserve_bid_is_refunded_under_its_own_id() {
    let mut router = minted_router();
    router
        .process(&listing_created(meta(AUCTION_HOUSE, 2, 0x02, 0), 7, 1, ALICE))
        .unwrap();
    router
        .process(&reserve_bid(meta(AUCTION_HOUSE, 3, 0x03, 1), 7, BOB, 1_000, true))
        .unwrap();
    router
        .process(&reserve_bid(meta(AUCTION_HOUSE, 9, 0x09, 2), 7, CAROL, 1_500, false))
        .unwrap();

    let store = router.store();
    let listing_id = ListingId::from_u64(7);
    let first = ReserveBidId::new(listing_id, B256::repeat_byte(0x03), 1);
    let second = ReserveBidId::new(listing_id, B256::repeat_byte(0x09), 2);

    let refunded = store
        .load::<InactiveReserveListingBid>(&first)
        .unwrap()
        .unwrap();
    assert_eq!(refunded.reason, ReserveBidTermination::Refunded);
    assert_eq!(refunded.bidder, BOB);
    assert_eq!(refunded.created, BlockStamp::new(36, 3));
    assert_eq!(refunded.inactivated, BlockStamp::new(108, 9));
    assert!(!store.exists::<ReserveListingBid>(&first).unwrap());

    let listing = store.load::<ReserveListing>(&listing_id).unwrap().unwrap();
    assert_eq!(listing.current_bid, Some(second));
    assert_eq!(listing.item, Some(item(1)));
    assert_eq!(listing.first_bid_time, 36);
    assert_eq!(listing.expected_end_timestamp, Some(36 + 86_400));
    assert!(store.exists::<ReserveListingBid>(&second).unwrap());
}

#[test]
fn test_reserve_listing_ends_with_winning_bid() {
    let mut router = minted_router();
    let events = vec![
        listing_created(meta(AUCTION_HOUSE, 2, 0x02, 0), 7, 1, ALICE),
        reserve_bid(meta(AUCTION_HOUSE, 3, 0x03, 0), 7, BOB, 1_000, true),
        listing_ended(meta(AUCTION_HOUSE, 9_000, 0x10, 3), 7, BOB, 1_000),
    ];
    router.process_all(&events).unwrap();

    let store = router.store();
    let listing = store
        .load::<ReserveListing>(&ListingId::from_u64(7))
        .unwrap()
        .unwrap();
    assert_eq!(listing.status, ListingStatus::Finished);
    assert_eq!(listing.current_bid, None);
    assert_eq!(listing.finalized, Some(BlockStamp::new(108_000, 9_000)));

    let archived = store.load_all::<InactiveReserveListingBid>().unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].reason, ReserveBidTermination::Final);
    assert_eq!(store.count(EntityKind::ReserveListingBid).unwrap(), 0);
}

#[test]
fn test_canceled_listing_rejects_later_bids() {
    let mut router = minted_router();
    router
        .process(&listing_created(meta(AUCTION_HOUSE, 2, 0x02, 0), 7, 1, ALICE))
        .unwrap();
    router
        .process(&MarketEvent::new(
            meta(AUCTION_HOUSE, 3, 0x03, 0),
            EventKind::ReserveListingCanceled(ReserveListingCanceledParams {
                listing_id: ListingId::from_u64(7),
            }),
        ))
        .unwrap();

    let outcome = router
        .process(&reserve_bid(meta(AUCTION_HOUSE, 4, 0x04, 0), 7, BOB, 1_000, true))
        .unwrap();
    match outcome {
        ProcessOutcome::Degraded(errors) => {
            assert!(matches!(errors[0], Error::InvariantViolation(_)));
        }
        other => panic!("expected a reported error, got {:?}", other),
    }
    assert_eq!(router.store().count(EntityKind::ReserveListingBid).unwrap(), 0);
}
