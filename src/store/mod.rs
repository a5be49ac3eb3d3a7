//! Entry and block stores
//!
//! Backing storage for the local namespace. Entries are keyed by their
//! clean path name, so a directory's children are the keys sharing its
//! `name/` prefix with no further slash. Blocks are content-addressed by
//! blake3 hash and shared between duplicated entries.

pub mod memory;
pub mod persistence;

pub use memory::MemoryStore;
pub use persistence::SledStore;

use crate::entry::DirEntry;
use crate::error::NamespaceError;
use crate::path::PathName;

/// Entry store interface
pub trait EntryStore: Send + Sync {
    fn get(&self, name: &PathName) -> Result<Option<DirEntry>, NamespaceError>;

    /// Insert or replace the entry stored under `entry.name`.
    fn put(&self, entry: &DirEntry) -> Result<(), NamespaceError>;

    /// Remove an entry; reports whether one was present.
    fn remove(&self, name: &PathName) -> Result<bool, NamespaceError>;

    /// Direct children of `dir`, sorted by name.
    fn children(&self, dir: &PathName) -> Result<Vec<DirEntry>, NamespaceError>;
}

/// Content-addressed block store interface
pub trait BlockStore: Send + Sync {
    /// Store a block and return its hex hash. Storing the same bytes twice is a no-op.
    fn put_block(&self, data: &[u8]) -> Result<String, NamespaceError>;

    fn get_block(&self, hash: &str) -> Result<Vec<u8>, NamespaceError>;
}

/// Hex blake3 hash used as a block address.
pub fn block_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Key prefix shared by the children of `dir`.
pub(crate) fn child_prefix(dir: &PathName) -> String {
    let name = dir.as_str();
    if name.ends_with('/') {
        name.to_string()
    } else {
        format!("{}/", name)
    }
}

/// Reports whether `key` names a direct child given the prefix of its parent.
pub(crate) fn is_direct_child(prefix: &str, key: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some(rest) => !rest.is_empty() && !rest.contains('/'),
        None => false,
    }
}
