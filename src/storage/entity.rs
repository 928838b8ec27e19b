//! Typed entity persistence.
//!
//! [`EntityStore`] is the load/save/remove collaborator every lifecycle
//! component reads and writes through. Each entity type owns a key prefix,
//! so live and archived records never share a keyspace even when they share
//! an id.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::model::ids::EntityKey;
use crate::storage::backend::{make_key, StorageBackend, TypedStore};

// ═══════════════════════════════════════════════════════════════════════════════
// ENTITY KINDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Every persisted entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Account
    User,
    /// ERC-20 (or native) currency
    Currency,
    /// Indexed NFT
    Item,
    /// Live ask
    Ask,
    /// Archived ask
    InactiveAsk,
    /// Live bid
    Bid,
    /// Archived bid
    InactiveBid,
    /// Historical token transfer
    Transfer,
    /// Historical URI change
    UriUpdate,
    /// Reserve auction
    ReserveListing,
    /// Live reserve auction bid
    ReserveListingBid,
    /// Archived reserve auction bid
    InactiveReserveListingBid,
}

impl EntityKind {
    /// All kinds, in display order
    pub const ALL: [EntityKind; 12] = [
        EntityKind::User,
        EntityKind::Currency,
        EntityKind::Item,
        EntityKind::Ask,
        EntityKind::InactiveAsk,
        EntityKind::Bid,
        EntityKind::InactiveBid,
        EntityKind::Transfer,
        EntityKind::UriUpdate,
        EntityKind::ReserveListing,
        EntityKind::ReserveListingBid,
        EntityKind::InactiveReserveListingBid,
    ];

    /// Storage key prefix
    pub fn prefix(&self) -> &'static [u8] {
        match self {
            EntityKind::User => b"usr:",
            EntityKind::Currency => b"cur:",
            EntityKind::Item => b"itm:",
            EntityKind::Ask => b"ask:",
            EntityKind::InactiveAsk => b"iak:",
            EntityKind::Bid => b"bid:",
            EntityKind::InactiveBid => b"ibd:",
            EntityKind::Transfer => b"trf:",
            EntityKind::UriUpdate => b"uri:",
            EntityKind::ReserveListing => b"rsl:",
            EntityKind::ReserveListingBid => b"rlb:",
            EntityKind::InactiveReserveListingBid => b"irb:",
        }
    }

    /// Entity type name
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Currency => "Currency",
            EntityKind::Item => "Item",
            EntityKind::Ask => "Ask",
            EntityKind::InactiveAsk => "InactiveAsk",
            EntityKind::Bid => "Bid",
            EntityKind::InactiveBid => "InactiveBid",
            EntityKind::Transfer => "Transfer",
            EntityKind::UriUpdate => "URIUpdate",
            EntityKind::ReserveListing => "ReserveListing",
            EntityKind::ReserveListingBid => "ReserveListingBid",
            EntityKind::InactiveReserveListingBid => "InactiveReserveListingBid",
        }
    }
}

/// A persisted record with a typed key
pub trait Entity: Serialize + DeserializeOwned {
    /// Key type
    type Key: EntityKey;

    /// Entity type (selects the keyspace)
    const KIND: EntityKind;

    /// This record's key
    fn key(&self) -> Self::Key;
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTITY STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Typed load/save/remove over a storage backend
pub struct EntityStore<B: StorageBackend> {
    store: TypedStore<B>,
}

impl<B: StorageBackend> EntityStore<B> {
    /// Create a new entity store
    pub fn new(backend: B) -> Self {
        Self {
            store: TypedStore::new(backend),
        }
    }

    fn storage_key<K: EntityKey>(kind: EntityKind, key: &K) -> Vec<u8> {
        make_key(kind.prefix(), &key.encode())
    }

    /// Load an entity by key
    pub fn load<E: Entity>(&self, key: &E::Key) -> Result<Option<E>> {
        self.store.get(&Self::storage_key(E::KIND, key))
    }

    /// Save (insert or overwrite) an entity
    pub fn save<E: Entity>(&self, entity: &E) -> Result<()> {
        self.store
            .set(&Self::storage_key(E::KIND, &entity.key()), entity)
    }

    /// Remove an entity, returning whether it existed
    pub fn remove<E: Entity>(&self, key: &E::Key) -> Result<bool> {
        self.store.delete(&Self::storage_key(E::KIND, key))
    }

    /// Check if an entity exists
    pub fn exists<E: Entity>(&self, key: &E::Key) -> Result<bool> {
        self.store.exists(&Self::storage_key(E::KIND, key))
    }

    /// Load every entity of a type, in key order
    pub fn load_all<E: Entity>(&self) -> Result<Vec<E>> {
        let keys = self.store.list_prefix(E::KIND.prefix())?;
        let mut entities = Vec::with_capacity(keys.len());

        for key in keys {
            if let Some(entity) = self.store.get::<E>(&key)? {
                entities.push(entity);
            }
        }

        Ok(entities)
    }

    /// Count entities of a kind
    pub fn count(&self, kind: EntityKind) -> Result<usize> {
        Ok(self.store.list_prefix(kind.prefix())?.len())
    }

    /// Flush pending writes
    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }

    /// Get the underlying backend
    pub fn backend(&self) -> &B {
        self.store.backend()
    }
}
