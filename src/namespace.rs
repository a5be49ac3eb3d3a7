//! Local namespace client
//!
//! Implements [`Client`] over an entry store and a block store. Names are
//! resolved element by element from the user's root, evaluating links as
//! they are met, so every entry handed back carries its real location.

use crate::client::{Client, DirServer};
use crate::entry::{BlockRef, DirEntry, EntryKind};
use crate::error::NamespaceError;
use crate::path::{has_glob_meta, match_element, unquote_glob, ParsedPath, PathName, UserName};
use crate::store::{BlockStore, EntryStore};
use std::sync::Arc;
use tracing::{debug, trace};

/// Maximum number of links evaluated while resolving one name.
pub const MAX_LINK_HOPS: usize = 20;

/// Default size of a content block.
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 20;

/// Namespace client backed by a local store.
pub struct LocalClient<S> {
    store: Arc<S>,
    user: UserName,
    block_size: usize,
}

impl<S> Clone for LocalClient<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            user: self.user.clone(),
            block_size: self.block_size,
        }
    }
}

impl<S: EntryStore + BlockStore + 'static> LocalClient<S> {
    pub fn new(store: Arc<S>, user: UserName) -> Self {
        Self {
            store,
            user,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn resolve(&self, name: &PathName, follow_final: bool) -> Result<DirEntry, NamespaceError> {
        let mut path = name.parse()?;
        let mut hops = 0;
        // Most recent link evaluated; a miss after it means the link is broken.
        let mut via_link: Option<PathName> = None;
        let missing = |via_link: &Option<PathName>| match via_link {
            Some(link) => NamespaceError::BrokenLink(link.clone()),
            None => NamespaceError::NotFound(name.clone()),
        };

        'restart: loop {
            let root = ParsedPath::root(path.user().clone()).path();
            let mut current = match self.store.get(&root)? {
                Some(entry) => entry,
                None => return Err(missing(&via_link)),
            };
            for i in 1..=path.n_elem() {
                if !current.is_dir() {
                    return Err(NamespaceError::NotDirectory(current.name));
                }
                let entry = match self.store.get(&path.first(i).path())? {
                    Some(entry) => entry,
                    None => return Err(missing(&via_link)),
                };
                let last = i == path.n_elem();
                if let EntryKind::Link { target } = &entry.kind {
                    if !last || follow_final {
                        hops += 1;
                        if hops > MAX_LINK_HOPS {
                            return Err(NamespaceError::LinkLoop(name.clone()));
                        }
                        let mut next = target.parse()?;
                        for elem in &path.elems()[i..] {
                            next = next.join(elem);
                        }
                        trace!(link = %entry.name, target = %next, "Evaluating link");
                        via_link = Some(entry.name.clone());
                        path = next;
                        continue 'restart;
                    }
                }
                current = entry;
            }
            return Ok(current);
        }
    }

    /// Real location for a new entry called `name`: its parent must resolve
    /// to a directory.
    fn placement(&self, name: &PathName) -> Result<ParsedPath, NamespaceError> {
        let parsed = name.parse()?;
        let (parent, last) = match (parsed.parent(), parsed.last_element()) {
            (Some(parent), Some(last)) => (parent, last.to_string()),
            _ => return Err(NamespaceError::invalid(name, "cannot place an entry at a root")),
        };
        let dir = self.resolve(&parent.path(), true)?;
        if !dir.is_dir() {
            return Err(NamespaceError::NotDirectory(dir.name));
        }
        Ok(dir.name.parse()?.join(&last))
    }

    fn ensure_absent(&self, target: &PathName) -> Result<(), NamespaceError> {
        if self.store.get(target)?.is_some() {
            return Err(NamespaceError::Exists(target.clone()));
        }
        Ok(())
    }

    /// Glob shared by the client and its directory servers. With
    /// `evaluate_links` unset the first link met on the way stops descent and
    /// is reported as `FollowLink` alongside the entries matched anyway.
    fn glob_entries(
        &self,
        pattern: &str,
        evaluate_links: bool,
    ) -> Result<Vec<DirEntry>, NamespaceError> {
        let (user, rest) = pattern.split_once('/').unwrap_or((pattern, ""));
        let user = UserName::parse(&unquote_glob(user))?;
        let mut elems: Vec<&str> = Vec::new();
        for elem in rest.split('/') {
            match elem {
                "" | "." => {}
                ".." => {
                    elems.pop();
                }
                other => elems.push(other),
            }
        }

        let root = ParsedPath::root(user).path();
        let root_entry = self
            .store
            .get(&root)?
            .ok_or_else(|| NamespaceError::NotFound(root.clone()))?;
        let mut frontier = vec![root_entry];
        let mut unfollowed: Option<DirEntry> = None;

        for (i, elem) in elems.iter().enumerate() {
            let last = i + 1 == elems.len();
            let mut next = Vec::new();
            for dir in &frontier {
                let candidates = if has_glob_meta(elem) {
                    let mut matched = Vec::new();
                    for child in self.store.children(&dir.name)? {
                        if match_element(elem, child.name.base())? {
                            matched.push(child);
                        }
                    }
                    matched
                } else {
                    let name = dir.name.parse()?.join(&unquote_glob(elem)).path();
                    self.store.get(&name)?.into_iter().collect()
                };

                for entry in candidates {
                    if last {
                        next.push(entry);
                        continue;
                    }
                    match &entry.kind {
                        EntryKind::Directory => next.push(entry),
                        EntryKind::Link { .. } if evaluate_links => {
                            match self.resolve(&entry.name, true) {
                                Ok(target) if target.is_dir() => next.push(target),
                                Ok(_) => {}
                                Err(NamespaceError::NotFound(_))
                                | Err(NamespaceError::BrokenLink(_)) => {}
                                Err(e) => return Err(e),
                            }
                        }
                        EntryKind::Link { .. } => {
                            if unfollowed.is_none() {
                                unfollowed = Some(entry);
                            }
                        }
                        EntryKind::File { .. } => {}
                    }
                }
            }
            frontier = next;
        }

        frontier.sort_by(|a, b| a.name.cmp(&b.name));
        frontier.dedup_by(|a, b| a.name == b.name);
        match unfollowed {
            Some(link) => Err(NamespaceError::FollowLink {
                link: Box::new(link),
                entries: frontier,
            }),
            None => Ok(frontier),
        }
    }

    fn store_blocks(&self, data: &[u8]) -> Result<Vec<BlockRef>, NamespaceError> {
        let mut blocks = Vec::new();
        let mut offset = 0u64;
        for chunk in data.chunks(self.block_size) {
            let hash = self.store.put_block(chunk)?;
            blocks.push(BlockRef {
                hash,
                offset,
                size: chunk.len() as u64,
            });
            offset += chunk.len() as u64;
        }
        Ok(blocks)
    }
}

impl<S: EntryStore + BlockStore + 'static> Client for LocalClient<S> {
    fn user(&self) -> &UserName {
        &self.user
    }

    fn lookup(&self, name: &PathName, follow_final: bool) -> Result<DirEntry, NamespaceError> {
        self.resolve(name, follow_final)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<DirEntry>, NamespaceError> {
        self.glob_entries(pattern, true)
    }

    fn make_directory(&self, name: &PathName) -> Result<DirEntry, NamespaceError> {
        let parsed = name.parse()?;
        let target = if parsed.is_root() {
            parsed
        } else {
            self.placement(name)?
        };
        let target = target.path();
        self.ensure_absent(&target)?;
        let entry = DirEntry::directory(target, self.user.clone());
        self.store.put(&entry)?;
        debug!(name = %entry.name, "Made directory");
        Ok(entry)
    }

    fn delete(&self, name: &PathName) -> Result<(), NamespaceError> {
        let entry = self.resolve(name, false)?;
        if entry.is_dir() && !self.store.children(&entry.name)?.is_empty() {
            return Err(NamespaceError::NotEmpty(entry.name));
        }
        self.store.remove(&entry.name)?;
        debug!(name = %entry.name, "Deleted entry");
        Ok(())
    }

    fn put(&self, name: &PathName, data: &[u8]) -> Result<DirEntry, NamespaceError> {
        if name.parse()?.is_root() {
            return Err(NamespaceError::IsDirectory(name.clone()));
        }
        let target = self.placement(name)?.path();
        let sequence = match self.store.get(&target)? {
            Some(existing) if existing.is_dir() => {
                return Err(NamespaceError::IsDirectory(target))
            }
            Some(existing) if existing.is_link() => {
                return Err(NamespaceError::invalid(&target, "cannot write through a link"))
            }
            Some(existing) => existing.sequence + 1,
            None => 1,
        };
        let blocks = self.store_blocks(data)?;
        let mut entry = DirEntry::file(target, blocks, self.user.clone());
        entry.sequence = sequence;
        self.store.put(&entry)?;
        debug!(name = %entry.name, size = data.len(), "Put file");
        Ok(entry)
    }

    fn get(&self, name: &PathName) -> Result<Vec<u8>, NamespaceError> {
        let entry = self.resolve(name, true)?;
        if entry.is_dir() {
            return Err(NamespaceError::IsDirectory(entry.name));
        }
        let mut data = Vec::with_capacity(entry.size() as usize);
        for block in entry.blocks() {
            data.extend_from_slice(&self.store.get_block(&block.hash)?);
        }
        Ok(data)
    }

    fn put_duplicate(&self, src: &PathName, dst: &PathName) -> Result<DirEntry, NamespaceError> {
        let source = self.resolve(src, true)?;
        if source.is_dir() {
            return Err(NamespaceError::IsDirectory(source.name));
        }
        let target = self.placement(dst)?.path();
        self.ensure_absent(&target)?;
        let entry = DirEntry::file(target, source.blocks().to_vec(), self.user.clone());
        self.store.put(&entry)?;
        debug!(src = %source.name, dst = %entry.name, "Duplicated entry");
        Ok(entry)
    }

    fn put_link(&self, target: &PathName, dst: &PathName) -> Result<DirEntry, NamespaceError> {
        let target = target.parse()?.path();
        let name = self.placement(dst)?.path();
        self.ensure_absent(&name)?;
        let entry = DirEntry::link(name, target, self.user.clone());
        self.store.put(&entry)?;
        debug!(name = %entry.name, "Made link");
        Ok(entry)
    }

    fn dir_server(&self, name: &PathName) -> Result<Arc<dyn DirServer>, NamespaceError> {
        name.parse()?;
        Ok(Arc::new(LocalDirServer {
            client: self.clone(),
        }))
    }
}

/// Directory server view of a local namespace; never evaluates links.
pub struct LocalDirServer<S> {
    client: LocalClient<S>,
}

impl<S: EntryStore + BlockStore + 'static> DirServer for LocalDirServer<S> {
    fn glob(&self, pattern: &str) -> Result<Vec<DirEntry>, NamespaceError> {
        self.client.glob_entries(pattern, false)
    }
}
