//! Recursive copy and delete over a namespace tree
//!
//! Both operations walk depth-first, one network call at a time, and stop at
//! the first error. Nothing already done is undone: a failed copy leaves the
//! entries copied so far in place and a failed delete leaves the entries
//! already removed gone. Callers re-list the tree to show the outcome.

use crate::client::Client;
use crate::entry::{DirEntry, EntryKind};
use crate::error::NamespaceError;
use crate::path::{all_files_glob, ParsedPath, PathName};
use tracing::{debug, info, instrument};

/// Copy and delete operations bound to a namespace client.
pub struct TreeOp<'a> {
    client: &'a dyn Client,
}

impl<'a> TreeOp<'a> {
    pub fn new(client: &'a dyn Client) -> Self {
        Self { client }
    }

    /// Recursively copy each source into the directory `dst`, in order.
    ///
    /// Files are copied with `put_duplicate`, so content blocks are shared
    /// rather than rewritten. Links are recreated, not followed.
    #[instrument(skip(self, srcs), fields(dst = %dst, sources = srcs.len()))]
    pub fn copy(&self, dst: &PathName, srcs: &[PathName]) -> Result<(), NamespaceError> {
        let dst_entry = self.client.lookup(dst, true)?;
        if !dst_entry.is_dir() {
            return Err(NamespaceError::NotDirectory(dst.clone()));
        }
        let dst_dir = dst_entry.name.parse()?;

        for src in srcs {
            // Don't follow a final link: it is copied as a link.
            let src_entry = self.client.lookup(src, false)?;
            self.copy_entry(&dst_dir, &src_entry)?;
        }
        info!("Copy completed");
        Ok(())
    }

    /// Copy one entry into `dst_dir`, which must exist and be a directory.
    fn copy_entry(&self, dst_dir: &ParsedPath, src: &DirEntry) -> Result<(), NamespaceError> {
        let src_path = src.name.parse()?;
        let elem = match src_path.last_element() {
            Some(elem) => elem,
            None => return Err(NamespaceError::invalid(&src.name, "cannot copy a root")),
        };
        if dst_dir.has_prefix(&src_path) {
            return Err(NamespaceError::invalid(
                &src.name,
                "cannot copy a directory into one of its sub-directories",
            ));
        }

        let dst = dst_dir.join(elem);
        let dst_name = dst.path();
        debug!(src = %src.name, dst = %dst_name, "Copying entry");

        match &src.kind {
            EntryKind::Directory => {
                self.client.make_directory(&dst_name)?;
                for child in self.children(&src.name, true)? {
                    self.copy_entry(&dst, &child)?;
                }
            }
            EntryKind::Link { target } => {
                self.client.put_link(target, &dst_name)?;
            }
            EntryKind::File { .. } => {
                self.client.put_duplicate(&src.name, &dst_name)?;
            }
        }
        Ok(())
    }

    /// Recursively delete each path, in order. Directory contents are
    /// removed before the directory itself. A root is never deleted.
    #[instrument(skip(self, paths), fields(paths = paths.len()))]
    pub fn delete(&self, paths: &[PathName]) -> Result<(), NamespaceError> {
        for name in paths {
            let entry = self.client.lookup(name, false)?;
            if entry.name.parse()?.is_root() {
                return Err(NamespaceError::invalid(&entry.name, "cannot delete a root"));
            }
            self.delete_entry(&entry)?;
        }
        info!("Delete completed");
        Ok(())
    }

    fn delete_entry(&self, entry: &DirEntry) -> Result<(), NamespaceError> {
        if entry.is_dir() {
            for child in self.children(&entry.name, false)? {
                self.delete_entry(&child)?;
            }
        }
        debug!(name = %entry.name, "Deleting entry");
        self.client.delete(&entry.name)
    }

    /// Direct children of `dir` as listed by its directory server. A partial
    /// listing cut short by a link is accepted only when `partial_ok`.
    fn children(&self, dir: &PathName, partial_ok: bool) -> Result<Vec<DirEntry>, NamespaceError> {
        let server = self.client.dir_server(dir)?;
        match server.glob(&all_files_glob(dir)) {
            Ok(entries) => Ok(entries),
            Err(NamespaceError::FollowLink { entries, .. }) if partial_ok => Ok(entries),
            Err(e) => Err(e),
        }
    }
}
