//! Namespace client interface
//!
//! The capability set tree operations and the browser backend are written
//! against. `LocalClient` in [`crate::namespace`] is the implementation this
//! crate ships; tests wrap it to inject failures.

use crate::entry::DirEntry;
use crate::error::NamespaceError;
use crate::path::{PathName, UserName};
use std::sync::Arc;

/// A directory server: the service holding the entries under some part of
/// the namespace.
pub trait DirServer: Send + Sync {
    /// Match entries against a glob pattern without evaluating links.
    ///
    /// Returns `NamespaceError::FollowLink` carrying the entries matched so
    /// far when the pattern would have to pass through a link.
    fn glob(&self, pattern: &str) -> Result<Vec<DirEntry>, NamespaceError>;
}

/// Client view of the namespace.
pub trait Client: Send + Sync {
    /// User the client acts as.
    fn user(&self) -> &UserName;

    /// Resolve a name. Intermediate links are always evaluated; a final link
    /// only when `follow_final` is set.
    fn lookup(&self, name: &PathName, follow_final: bool) -> Result<DirEntry, NamespaceError>;

    /// Match a pattern, evaluating links along the way.
    fn glob(&self, pattern: &str) -> Result<Vec<DirEntry>, NamespaceError>;

    fn make_directory(&self, name: &PathName) -> Result<DirEntry, NamespaceError>;

    /// Remove a single entry. Does not follow a final link; directories must be empty.
    fn delete(&self, name: &PathName) -> Result<(), NamespaceError>;

    /// Create or replace a file with the given content.
    fn put(&self, name: &PathName, data: &[u8]) -> Result<DirEntry, NamespaceError>;

    /// Read a file's content, following links.
    fn get(&self, name: &PathName) -> Result<Vec<u8>, NamespaceError>;

    /// Create `dst` referencing the same content blocks as `src`.
    fn put_duplicate(&self, src: &PathName, dst: &PathName) -> Result<DirEntry, NamespaceError>;

    /// Create a link at `dst` pointing at `target`.
    fn put_link(&self, target: &PathName, dst: &PathName) -> Result<DirEntry, NamespaceError>;

    /// Directory server responsible for `name`.
    fn dir_server(&self, name: &PathName) -> Result<Arc<dyn DirServer>, NamespaceError>;
}
