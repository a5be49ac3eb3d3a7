//! Directory entries
//!
//! A `DirEntry` is the metadata record for one namespace object. File
//! content is referenced by block, never embedded, so an entry can be
//! duplicated without touching stored bytes.

use crate::path::{PathName, UserName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to one stored block of file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// Hex blake3 hash of the block bytes
    pub hash: String,
    /// Offset of the block within the file
    pub offset: u64,
    pub size: u64,
}

/// What kind of object an entry describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Directory,
    Link { target: PathName },
    File { blocks: Vec<BlockRef> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: PathName,
    pub kind: EntryKind,
    pub writer: UserName,
    pub sequence: u64,
    /// Modification time, seconds since the Unix epoch
    pub time: i64,
}

impl DirEntry {
    fn new(name: PathName, kind: EntryKind, writer: UserName) -> Self {
        DirEntry {
            name,
            kind,
            writer,
            sequence: 1,
            time: Utc::now().timestamp(),
        }
    }

    pub fn directory(name: PathName, writer: UserName) -> Self {
        Self::new(name, EntryKind::Directory, writer)
    }

    pub fn link(name: PathName, target: PathName, writer: UserName) -> Self {
        Self::new(name, EntryKind::Link { target }, writer)
    }

    pub fn file(name: PathName, blocks: Vec<BlockRef>, writer: UserName) -> Self {
        Self::new(name, EntryKind::File { blocks }, writer)
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, EntryKind::Link { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File { .. })
    }

    pub fn link_target(&self) -> Option<&PathName> {
        match &self.kind {
            EntryKind::Link { target } => Some(target),
            _ => None,
        }
    }

    pub fn blocks(&self) -> &[BlockRef] {
        match &self.kind {
            EntryKind::File { blocks } => blocks,
            _ => &[],
        }
    }

    /// Content size in bytes; zero for directories and links.
    pub fn size(&self) -> u64 {
        self.blocks().iter().map(|b| b.size).sum()
    }

    pub fn modified(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.time, 0).unwrap_or_default()
    }
}
