//! Persistence layer for the namespace: sled-backed entry and block store

use crate::entry::DirEntry;
use crate::error::NamespaceError;
use crate::path::PathName;
use crate::store::{block_hash, child_prefix, is_direct_child, BlockStore, EntryStore};
use std::path::Path;

const ENTRIES_TREE: &str = "entries";
const BLOCKS_TREE: &str = "blocks";

fn storage_err(context: &str, e: impl std::fmt::Display) -> NamespaceError {
    NamespaceError::Storage(format!("{}: {}", context, e))
}

/// Sled-based implementation of [`EntryStore`] and [`BlockStore`]
///
/// Entries live in the `entries` tree keyed by clean path name and encoded
/// with bincode; blocks live in the `blocks` tree keyed by hex hash.
pub struct SledStore {
    db: sled::Db,
    entries: sled::Tree,
    blocks: sled::Tree,
}

impl SledStore {
    /// Open (or create) a store at the given directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, NamespaceError> {
        let db = sled::open(path).map_err(|e| storage_err("Failed to open sled database", e))?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, NamespaceError> {
        let entries = db
            .open_tree(ENTRIES_TREE)
            .map_err(|e| storage_err("Failed to open entries tree", e))?;
        let blocks = db
            .open_tree(BLOCKS_TREE)
            .map_err(|e| storage_err("Failed to open blocks tree", e))?;
        Ok(Self {
            db,
            entries,
            blocks,
        })
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), NamespaceError> {
        self.db
            .flush()
            .map_err(|e| storage_err("Failed to flush database", e))?;
        Ok(())
    }

    fn decode(value: &[u8]) -> Result<DirEntry, NamespaceError> {
        bincode::deserialize(value).map_err(|e| storage_err("Failed to deserialize entry", e))
    }
}

impl EntryStore for SledStore {
    fn get(&self, name: &PathName) -> Result<Option<DirEntry>, NamespaceError> {
        match self
            .entries
            .get(name.as_str().as_bytes())
            .map_err(|e| storage_err("Failed to get entry", e))?
        {
            Some(value) => Ok(Some(Self::decode(&value)?)),
            None => Ok(None),
        }
    }

    fn put(&self, entry: &DirEntry) -> Result<(), NamespaceError> {
        let value =
            bincode::serialize(entry).map_err(|e| storage_err("Failed to serialize entry", e))?;
        self.entries
            .insert(entry.name.as_str().as_bytes(), value)
            .map_err(|e| storage_err("Failed to put entry", e))?;
        Ok(())
    }

    fn remove(&self, name: &PathName) -> Result<bool, NamespaceError> {
        let previous = self
            .entries
            .remove(name.as_str().as_bytes())
            .map_err(|e| storage_err("Failed to remove entry", e))?;
        Ok(previous.is_some())
    }

    fn children(&self, dir: &PathName) -> Result<Vec<DirEntry>, NamespaceError> {
        let prefix = child_prefix(dir);
        let mut children = Vec::new();
        for item in self.entries.scan_prefix(prefix.as_bytes()) {
            let (key, value) = item.map_err(|e| storage_err("Failed to scan entries", e))?;
            let key = String::from_utf8_lossy(&key);
            if !is_direct_child(&prefix, &key) {
                continue;
            }
            children.push(Self::decode(&value)?);
        }
        Ok(children)
    }
}

impl BlockStore for SledStore {
    fn put_block(&self, data: &[u8]) -> Result<String, NamespaceError> {
        let hash = block_hash(data);
        if !self
            .blocks
            .contains_key(hash.as_bytes())
            .map_err(|e| storage_err("Failed to check block", e))?
        {
            self.blocks
                .insert(hash.as_bytes(), data)
                .map_err(|e| storage_err("Failed to put block", e))?;
        }
        Ok(hash)
    }

    fn get_block(&self, hash: &str) -> Result<Vec<u8>, NamespaceError> {
        match self
            .blocks
            .get(hash.as_bytes())
            .map_err(|e| storage_err("Failed to get block", e))?
        {
            Some(value) => Ok(value.to_vec()),
            None => Err(NamespaceError::Storage(format!("missing block {}", hash))),
        }
    }
}
