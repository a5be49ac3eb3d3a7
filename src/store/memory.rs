//! In-memory entry and block store.

use crate::entry::DirEntry;
use crate::error::NamespaceError;
use crate::path::PathName;
use crate::store::{block_hash, child_prefix, is_direct_child, BlockStore, EntryStore};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Store that keeps everything in process memory. Used by tests and for
/// throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, DirEntry>>,
    blocks: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.read().len()
    }
}

impl EntryStore for MemoryStore {
    fn get(&self, name: &PathName) -> Result<Option<DirEntry>, NamespaceError> {
        Ok(self.entries.read().get(name.as_str()).cloned())
    }

    fn put(&self, entry: &DirEntry) -> Result<(), NamespaceError> {
        self.entries
            .write()
            .insert(entry.name.as_str().to_string(), entry.clone());
        Ok(())
    }

    fn remove(&self, name: &PathName) -> Result<bool, NamespaceError> {
        Ok(self.entries.write().remove(name.as_str()).is_some())
    }

    fn children(&self, dir: &PathName) -> Result<Vec<DirEntry>, NamespaceError> {
        let prefix = child_prefix(dir);
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| is_direct_child(&prefix, key))
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

impl BlockStore for MemoryStore {
    fn put_block(&self, data: &[u8]) -> Result<String, NamespaceError> {
        let hash = block_hash(data);
        self.blocks
            .write()
            .entry(hash.clone())
            .or_insert_with(|| data.to_vec());
        Ok(hash)
    }

    fn get_block(&self, hash: &str) -> Result<Vec<u8>, NamespaceError> {
        self.blocks
            .read()
            .get(hash)
            .cloned()
            .ok_or_else(|| NamespaceError::Storage(format!("missing block {}", hash)))
    }
}
