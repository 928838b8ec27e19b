//! Item lifecycle: mint, transfer, burn, approvals, URI and bid-share updates.

use alloy_primitives::{Address, B256};
use tracing::{debug, info, warn};

use super::{Diagnostics, IdentityResolver};
use crate::error::{Error, Result};
use crate::events::{
    ApprovalForAllParams, ApprovalParams, BidShareUpdatedParams, EventMeta, TransferParams,
    UriUpdatedParams,
};
use crate::metadata::{CallResult, TokenMetadataSource};
use crate::model::{Item, ItemId, Transfer, UriKind, UriUpdate, User};
use crate::storage::{EntityStore, StorageBackend};

/// Owns [`Item`], [`Transfer`] and [`UriUpdate`] records
pub struct ItemLifecycle<'a, B: StorageBackend, C: TokenMetadataSource> {
    store: &'a EntityStore<B>,
    chain: &'a C,
}

impl<'a, B: StorageBackend, C: TokenMetadataSource> ItemLifecycle<'a, B, C> {
    /// Create the handler
    pub fn new(store: &'a EntityStore<B>, chain: &'a C) -> Self {
        Self { store, chain }
    }

    fn users(&self) -> IdentityResolver<'a, B> {
        IdentityResolver::new(self.store)
    }

    /// Load an item, reporting its absence
    fn load_item(&self, id: &ItemId, diagnostics: &mut Diagnostics) -> Result<Option<Item>> {
        let item = self.store.load::<Item>(id)?;
        if item.is_none() {
            diagnostics.missing(Error::ItemNotFound(id.to_string()))?;
        }
        Ok(item)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSFERS
    // ═══════════════════════════════════════════════════════════════════════════

    /// ERC-721 `Transfer`: mint, ownership change, or burn
    pub fn transfer(
        &self,
        meta: &EventMeta,
        id: ItemId,
        params: &TransferParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        info!(
            token_id = %id.token_id,
            from = %params.from,
            to = %params.to,
            "Starting handler for Transfer"
        );

        let users = self.users();
        users.find_or_create_user(params.to)?;
        users.find_or_create_user(params.from)?;

        if params.from == Address::ZERO {
            return self.mint(meta, id, params);
        }

        // The transfer record is kept even without an item: finalize
        // correlation reads it later.
        if let Some(mut item) = self.load_item(&id, diagnostics)? {
            if params.to == Address::ZERO {
                item.prev_owner = Address::ZERO;
                item.burned = Some(meta.stamp());
            }
            item.owner = params.to;
            item.approved = None;
            self.store.save(&item)?;
        }

        self.record_transfer(meta, id, params.from, params.to)?;

        info!(token_id = %id.token_id, "Completed handler for Transfer");
        Ok(())
    }

    fn mint(&self, meta: &EventMeta, id: ItemId, params: &TransferParams) -> Result<()> {
        let creator = params.to;
        let (contract, token_id) = (id.contract, id.token_id);

        let content_uri = degraded(&id, "tokenURI", self.chain.token_uri(contract, token_id));
        let metadata_uri = degraded(
            &id,
            "tokenMetadataURI",
            self.chain.token_metadata_uri(contract, token_id),
        );
        let content_hash = degraded(
            &id,
            "tokenContentHashes",
            self.chain.token_content_hash(contract, token_id),
        );
        let metadata_hash = degraded(
            &id,
            "tokenMetadataHashes",
            self.chain.token_metadata_hash(contract, token_id),
        );
        let exchange_contract = degraded(
            &id,
            "itemExchangeContract",
            self.chain.exchange_contract(contract),
        );
        let bid_shares = exchange_contract.and_then(|exchange| {
            degraded(
                &id,
                "bidSharesForToken",
                self.chain.bid_shares_for_token(exchange, token_id),
            )
        });

        let item = Item {
            id,
            transaction_hash: meta.tx_hash,
            owner: creator,
            creator,
            prev_owner: creator,
            approved: None,
            content_uri: content_uri.unwrap_or_default(),
            content_hash: content_hash.unwrap_or(B256::ZERO),
            metadata_uri: metadata_uri.unwrap_or_default(),
            metadata_hash: metadata_hash.unwrap_or(B256::ZERO),
            exchange_contract,
            bid_shares,
            created: meta.stamp(),
            burned: None,
        };
        self.store.save(&item)?;
        self.record_transfer(meta, id, Address::ZERO, creator)?;

        info!(token_id = %token_id, creator = %creator, "Minted item");
        Ok(())
    }

    fn record_transfer(
        &self,
        meta: &EventMeta,
        id: ItemId,
        from: Address,
        to: Address,
    ) -> Result<()> {
        let transfer = Transfer {
            id: meta.log_id(id.token_id),
            item: id,
            from,
            to,
            transaction_hash: meta.tx_hash,
            created: meta.stamp(),
        };
        debug!(transfer = %transfer.id, "Recorded transfer");
        self.store.save(&transfer)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // APPROVALS
    // ═══════════════════════════════════════════════════════════════════════════

    /// ERC-721 `Approval`: sets or clears the single approved operator
    pub fn approval(
        &self,
        id: ItemId,
        params: &ApprovalParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        info!(
            token_id = %id.token_id,
            owner = %params.owner,
            approved = %params.approved,
            "Starting handler for Approval"
        );

        let Some(mut item) = self.load_item(&id, diagnostics)? else {
            return Ok(());
        };

        item.approved = if params.approved == Address::ZERO {
            None
        } else {
            Some(self.users().find_or_create_user(params.approved)?.id)
        };
        self.store.save(&item)?;

        info!(token_id = %id.token_id, "Completed handler for Approval");
        Ok(())
    }

    /// ERC-721 `ApprovalForAll`: edits the owner's operator set
    pub fn approval_for_all(&self, params: &ApprovalForAllParams) -> Result<()> {
        info!(
            owner = %params.owner,
            operator = %params.operator,
            approved = params.approved,
            "Starting handler for ApprovalForAll"
        );

        let users = self.users();
        let mut owner: User = users.find_or_create_user(params.owner)?;
        let operator = users.find_or_create_user(params.operator)?;

        let changed = if params.approved {
            owner.authorized_users.insert(operator.id)
        } else {
            owner.authorized_users.remove(&operator.id)
        };

        if changed {
            self.store.save(&owner)?;
        } else {
            debug!(owner = %params.owner, "Operator set unchanged");
        }

        info!(owner = %params.owner, "Completed handler for ApprovalForAll");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // URIS AND BID SHARES
    // ═══════════════════════════════════════════════════════════════════════════

    /// `TokenURIUpdated` / `TokenMetadataURIUpdated`
    pub fn uri_updated(
        &self,
        meta: &EventMeta,
        id: ItemId,
        kind: UriKind,
        params: &UriUpdatedParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        info!(token_id = %id.token_id, kind = ?kind, "Starting handler for URI update");

        let Some(mut item) = self.load_item(&id, diagnostics)? else {
            return Ok(());
        };
        let updater = self.users().find_or_create_user(params.owner)?;

        let slot = match kind {
            UriKind::Content => &mut item.content_uri,
            UriKind::Metadata => &mut item.metadata_uri,
        };
        let previous = std::mem::replace(slot, params.uri.clone());

        let update = UriUpdate {
            id: meta.log_id(id.token_id),
            item: id,
            kind,
            from: previous,
            to: params.uri.clone(),
            updater: updater.id,
            owner: item.owner,
            transaction_hash: meta.tx_hash,
            created: meta.stamp(),
        };
        self.store.save(&update)?;
        self.store.save(&item)?;

        info!(token_id = %id.token_id, kind = ?kind, "Completed handler for URI update");
        Ok(())
    }

    /// `BidShareUpdated`: overwrites the shares, no history kept
    pub fn bid_share_updated(
        &self,
        id: ItemId,
        params: &BidShareUpdatedParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        info!(token_id = %id.token_id, "Starting handler for BidShareUpdated");

        let Some(mut item) = self.load_item(&id, diagnostics)? else {
            return Ok(());
        };
        item.bid_shares = Some(params.bid_shares);
        self.store.save(&item)?;

        info!(token_id = %id.token_id, "Completed handler for BidShareUpdated");
        Ok(())
    }
}

/// Log a reverted metadata call and drop it
fn degraded<T>(item: &ItemId, call: &'static str, result: CallResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(item = %item, call, "{}", err);
            None
        }
    }
}
