//! Save-game blob persistence.
//!
//! The host exposes a flat key/value store of named byte blobs. Each logical table
//! (claims, banks, accounts, graves) is written as one blob, in full, at save time and
//! read back in full at load time. Tables describe their own encoding through
//! [`SaveBlob`]; nothing is discovered at runtime.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};

pub mod errors;

pub use errors::StorageError;

const TREE_SAVEGAME: &str = "savegame";

/// Named blob store provided by the host (or by sled when running standalone).
pub trait SaveGameStore: Send + Sync {
    fn store_data(&self, name: &str, data: &[u8]) -> Result<(), StorageError>;

    fn get_data(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Names of all blobs currently stored, sorted.
    fn names(&self) -> Result<Vec<String>, StorageError>;
}

/// Explicit encoding contract for a persisted table.
pub trait SaveBlob: Sized + Default {
    /// Blob name inside the save game.
    const KEY: &'static str;

    fn to_bytes(&self) -> Result<Vec<u8>, StorageError>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError>;
}

/// Load a table, falling back to an empty one when the blob is absent or unreadable.
///
/// Corrupt data is dropped with a warning; the next save overwrites it.
pub fn load_or_default<T: SaveBlob>(store: &dyn SaveGameStore) -> T {
    match store.get_data(T::KEY) {
        Ok(Some(bytes)) => match T::from_bytes(&bytes) {
            Ok(value) => {
                debug!("loaded save blob {} ({} bytes)", T::KEY, bytes.len());
                value
            }
            Err(e) => {
                warn!("save blob {} is unreadable, resetting: {}", T::KEY, e);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!("failed to read save blob {}, resetting: {}", T::KEY, e);
            T::default()
        }
    }
}

/// Encode a table into a `(name, bytes)` pair ready to be written.
pub fn encode<T: SaveBlob>(value: &T) -> Result<(&'static str, Vec<u8>), StorageError> {
    Ok((T::KEY, value.to_bytes()?))
}

pub fn save<T: SaveBlob>(store: &dyn SaveGameStore, value: &T) -> Result<(), StorageError> {
    let (name, bytes) = encode(value)?;
    store.store_data(name, &bytes)
}

/// Volatile store, mainly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySaveStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveGameStore for MemorySaveStore {
    fn store_data(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        let mut blobs = self.blobs.lock().map_err(|_| StorageError::Poisoned)?;
        blobs.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn get_data(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let blobs = self.blobs.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(blobs.get(name).cloned())
    }

    fn names(&self) -> Result<Vec<String>, StorageError> {
        let blobs = self.blobs.lock().map_err(|_| StorageError::Poisoned)?;
        let mut names: Vec<String> = blobs.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct SledSaveStoreBuilder {
    path: PathBuf,
    tree: String,
}

impl SledSaveStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tree: TREE_SAVEGAME.to_string(),
        }
    }

    /// Keep blobs in a differently named tree (one world per tree).
    pub fn tree(mut self, name: &str) -> Self {
        self.tree = name.to_string();
        self
    }

    pub fn open(self) -> Result<SledSaveStore, StorageError> {
        SledSaveStore::open_with_tree(self.path, &self.tree)
    }
}

/// Sled-backed save store used by the standalone CLI.
pub struct SledSaveStore {
    _db: sled::Db,
    blobs: sled::Tree,
}

impl SledSaveStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::open_with_tree(path, TREE_SAVEGAME)
    }

    fn open_with_tree<P: AsRef<Path>>(path: P, tree: &str) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let blobs = db.open_tree(tree)?;
        Ok(Self { _db: db, blobs })
    }
}

impl SaveGameStore for SledSaveStore {
    fn store_data(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        self.blobs.insert(name.as_bytes(), data)?;
        self.blobs.flush()?;
        Ok(())
    }

    fn get_data(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blobs.get(name.as_bytes())?.map(|bytes| bytes.to_vec()))
    }

    fn names(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for entry in self.blobs.iter() {
            let (key, _) = entry?;
            names.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(names)
    }
}
