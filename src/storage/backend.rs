//! Storage backend implementations.
//!
//! This module provides the byte-level backends the entity store sits on:
//! - InMemoryStore: Fast, ephemeral storage for tests and dry runs
//! - SnapshotStore: Whole-keyspace snapshot on disk, JSON or bincode encoded

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// STORAGE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Key type for storage operations
pub type StorageKey = Vec<u8>;

/// Value type for storage operations
pub type StorageValue = Vec<u8>;

/// Trait for storage backends
///
/// All methods take `&self`; a write is visible to the next read.
pub trait StorageBackend: Send + Sync {
    /// Get a value by key
    fn get(&self, key: &[u8]) -> Result<Option<StorageValue>>;

    /// Set a value for a key
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Delete a key, returning whether it existed
    fn delete(&self, key: &[u8]) -> Result<bool>;

    /// Check if a key exists
    fn exists(&self, key: &[u8]) -> Result<bool>;

    /// List all keys with a given prefix, in key order
    fn list_prefix(&self, prefix: &[u8]) -> Result<Vec<StorageKey>>;

    /// Flush any pending writes to persistent storage
    fn flush(&self) -> Result<()>;
}

fn lock_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Internal(format!("Lock error: {}", e))
}

fn keys_with_prefix(data: &BTreeMap<Vec<u8>, Vec<u8>>, prefix: &[u8]) -> Vec<StorageKey> {
    data.range(prefix.to_vec()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, _)| k.clone())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory storage backend (for testing and ephemeral use)
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of entries
    pub fn len(&self) -> Result<usize> {
        Ok(self.data.read().map_err(lock_err)?.len())
    }

    /// Check if empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl StorageBackend for InMemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<StorageValue>> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut data = self.data.write().map_err(lock_err)?;
        data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        let mut data = self.data.write().map_err(lock_err)?;
        Ok(data.remove(key).is_some())
    }

    fn exists(&self, key: &[u8]) -> Result<bool> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.contains_key(key))
    }

    fn list_prefix(&self, prefix: &[u8]) -> Result<Vec<StorageKey>> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(keys_with_prefix(&data, prefix))
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SNAPSHOT STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// On-disk encoding of a [`SnapshotStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// Hex-encoded keys and values in a pretty JSON object (`state.json`)
    Json,
    /// Compact bincode map (`state.bin`)
    Bincode,
}

impl SnapshotFormat {
    fn file_name(&self) -> &'static str {
        match self {
            SnapshotFormat::Json => "state.json",
            SnapshotFormat::Bincode => "state.bin",
        }
    }
}

/// File-backed store: the full keyspace lives in memory and is written out
/// as one snapshot on [`StorageBackend::flush`] (and on drop).
#[derive(Debug)]
pub struct SnapshotStore {
    /// Base directory for storage
    base_path: PathBuf,
    /// Snapshot encoding
    format: SnapshotFormat,
    /// In-memory cache
    cache: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    /// Whether cache has unflushed writes
    dirty: RwLock<bool>,
}

impl SnapshotStore {
    /// Open (or create) a snapshot store in `path`
    pub fn open<P: AsRef<Path>>(path: P, format: SnapshotFormat) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                Error::Storage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let store = Self {
            base_path,
            format,
            cache: RwLock::new(BTreeMap::new()),
            dirty: RwLock::new(false),
        };
        store.load_from_disk()?;

        Ok(store)
    }

    /// Path of the snapshot file
    pub fn snapshot_path(&self) -> PathBuf {
        self.base_path.join(self.format.file_name())
    }

    fn load_from_disk(&self) -> Result<()> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(());
        }

        let file = File::open(&path)
            .map_err(|e| Error::Storage(format!("Failed to open snapshot: {}", e)))?;

        let loaded: BTreeMap<Vec<u8>, Vec<u8>> = match self.format {
            SnapshotFormat::Json => {
                let encoded: BTreeMap<String, String> =
                    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                        Error::Deserialization(format!("Failed to parse snapshot: {}", e))
                    })?;
                let mut decoded = BTreeMap::new();
                for (key_hex, value_hex) in encoded {
                    let key = hex::decode(&key_hex).map_err(|e| {
                        Error::Deserialization(format!("Invalid key in snapshot: {}", e))
                    })?;
                    let value = hex::decode(&value_hex).map_err(|e| {
                        Error::Deserialization(format!("Invalid value in snapshot: {}", e))
                    })?;
                    decoded.insert(key, value);
                }
                decoded
            }
            SnapshotFormat::Bincode => {
                let mut raw = Vec::new();
                BufReader::new(file)
                    .read_to_end(&mut raw)
                    .map_err(|e| Error::Storage(format!("Failed to read snapshot: {}", e)))?;
                bincode::deserialize(&raw).map_err(|e| {
                    Error::Deserialization(format!("Failed to decode snapshot: {}", e))
                })?
            }
        };

        *self.cache.write().map_err(lock_err)? = loaded;
        Ok(())
    }

    fn save_to_disk(&self) -> Result<()> {
        let cache = self.cache.read().map_err(lock_err)?;

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.snapshot_path())
            .map_err(|e| Error::Storage(format!("Failed to open snapshot for writing: {}", e)))?;
        let mut writer = BufWriter::new(file);

        match self.format {
            SnapshotFormat::Json => {
                let encoded: BTreeMap<String, String> = cache
                    .iter()
                    .map(|(k, v)| (hex::encode(k), hex::encode(v)))
                    .collect();
                serde_json::to_writer_pretty(&mut writer, &encoded).map_err(|e| {
                    Error::Serialization(format!("Failed to write snapshot: {}", e))
                })?;
            }
            SnapshotFormat::Bincode => {
                let raw = bincode::serialize(&*cache).map_err(|e| {
                    Error::Serialization(format!("Failed to encode snapshot: {}", e))
                })?;
                writer
                    .write_all(&raw)
                    .map_err(|e| Error::Storage(format!("Failed to write snapshot: {}", e)))?;
            }
        }
        writer
            .flush()
            .map_err(|e| Error::Storage(format!("Failed to write snapshot: {}", e)))?;

        *self.dirty.write().map_err(lock_err)? = false;
        Ok(())
    }

    fn mark_dirty(&self) -> Result<()> {
        *self.dirty.write().map_err(lock_err)? = true;
        Ok(())
    }
}

impl StorageBackend for SnapshotStore {
    fn get(&self, key: &[u8]) -> Result<Option<StorageValue>> {
        let cache = self.cache.read().map_err(lock_err)?;
        Ok(cache.get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.cache
            .write()
            .map_err(lock_err)?
            .insert(key.to_vec(), value.to_vec());
        self.mark_dirty()
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        let existed = self.cache.write().map_err(lock_err)?.remove(key).is_some();
        if existed {
            self.mark_dirty()?;
        }
        Ok(existed)
    }

    fn exists(&self, key: &[u8]) -> Result<bool> {
        let cache = self.cache.read().map_err(lock_err)?;
        Ok(cache.contains_key(key))
    }

    fn list_prefix(&self, prefix: &[u8]) -> Result<Vec<StorageKey>> {
        let cache = self.cache.read().map_err(lock_err)?;
        Ok(keys_with_prefix(&cache, prefix))
    }

    fn flush(&self) -> Result<()> {
        let dirty = *self.dirty.read().map_err(lock_err)?;
        if dirty {
            self.save_to_disk()?;
        }
        Ok(())
    }
}

impl Drop for SnapshotStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(path = %self.snapshot_path().display(), "snapshot flush on drop failed: {}", e);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TYPED STORE WRAPPER
// ═══════════════════════════════════════════════════════════════════════════════

/// Type-safe wrapper around a storage backend (values are bincode encoded)
pub struct TypedStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> TypedStore<B> {
    /// Create a new typed store
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Get a typed value
    pub fn get<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>> {
        match self.backend.get(key)? {
            Some(data) => {
                let value = bincode::deserialize(&data).map_err(|e| {
                    Error::Deserialization(format!("Failed to deserialize value: {}", e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value
    pub fn set<T: Serialize>(&self, key: &[u8], value: &T) -> Result<()> {
        let data = bincode::serialize(value)
            .map_err(|e| Error::Serialization(format!("Failed to serialize value: {}", e)))?;
        self.backend.set(key, &data)
    }

    /// Delete a value
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        self.backend.delete(key)
    }

    /// Check if a key exists
    pub fn exists(&self, key: &[u8]) -> Result<bool> {
        self.backend.exists(key)
    }

    /// List keys with prefix
    pub fn list_prefix(&self, prefix: &[u8]) -> Result<Vec<StorageKey>> {
        self.backend.list_prefix(prefix)
    }

    /// Flush pending writes
    pub fn flush(&self) -> Result<()> {
        self.backend.flush()
    }

    /// Get the underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Create a key with a prefix
pub fn make_key(prefix: &[u8], key: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(prefix.len() + key.len());
    result.extend_from_slice(prefix);
    result.extend_from_slice(key);
    result
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
