//! Storage module for indexed entities.
//!
//! ## Backends
//!
//! - **InMemoryStore**: Fast, ephemeral storage for testing
//! - **SnapshotStore**: Full-keyspace snapshot on disk (JSON or bincode)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use motif_indexer::storage::{EntityStore, InMemoryStore};
//! use motif_indexer::model::Item;
//!
//! let store = EntityStore::new(InMemoryStore::new());
//! let item: Option<Item> = store.load(&item_id)?;
//! ```

pub mod backend;
pub mod entity;

pub use backend::*;
pub use entity::{Entity, EntityKind, EntityStore};
