//! Shared test utilities for integration tests
//!
//! Provides isolated XDG directories, seeded namespaces, and a client wrapper
//! that records mutations and injects failures.

use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use upspin_ui::client::{Client, DirServer};
use upspin_ui::entry::DirEntry;
use upspin_ui::error::NamespaceError;
use upspin_ui::namespace::LocalClient;
use upspin_ui::path::{PathName, UserName};
use upspin_ui::store::MemoryStore;

/// Global mutex to serialize environment variable access across all tests
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    vars: Vec<(&'static str, Option<String>)>,
}

const ISOLATED_VARS: [&str; 5] = [
    "HOME",
    "XDG_CONFIG_HOME",
    "XDG_DATA_HOME",
    "UPSPIN_UI__USER_NAME",
    "UPSPIN_UI__STORAGE__BLOCK_SIZE",
];

impl EnvState {
    fn capture() -> Self {
        Self {
            vars: ISOLATED_VARS
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.vars {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Set up isolated XDG directories for a test with automatic cleanup
///
/// XDG_CONFIG_HOME is the temp dir itself, XDG_DATA_HOME is `data/` and HOME
/// is `home/` beneath it. Variables are restored after `f` returns.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_config_home = test_dir.path().to_path_buf();
    let test_data_home = test_dir.path().join("data");
    let test_home = test_dir.path().join("home");

    std::fs::create_dir_all(&test_data_home).unwrap();
    std::fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_config_home.to_str().unwrap());
    std::env::set_var("XDG_DATA_HOME", test_data_home.to_str().unwrap());
    std::env::remove_var("UPSPIN_UI__USER_NAME");
    std::env::remove_var("UPSPIN_UI__STORAGE__BLOCK_SIZE");

    let result = f();

    env_state.restore();

    result
}

pub const USER: &str = "ann@example.com";

pub fn p(s: &str) -> PathName {
    PathName::from(s)
}

/// Memory-backed client for `ann@example.com` with the root directory made.
pub fn memory_client() -> LocalClient<MemoryStore> {
    let client = LocalClient::new(Arc::new(MemoryStore::new()), UserName::new(USER));
    client.make_directory(&p("ann@example.com/")).unwrap();
    client
}

/// Build a tree from `(path, content)` pairs; `None` content makes a directory.
pub fn seed(client: &dyn Client, items: &[(&str, Option<&str>)]) {
    for (name, content) in items {
        match content {
            Some(data) => {
                client.put(&p(name), data.as_bytes()).unwrap();
            }
            None => {
                client.make_directory(&p(name)).unwrap();
            }
        }
    }
}

pub fn exists(client: &dyn Client, name: &str) -> bool {
    client.lookup(&p(name), false).is_ok()
}

/// One namespace mutation observed by [`RecordingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    MakeDirectory(String),
    PutDuplicate { src: String, dst: String },
    PutLink { target: String, dst: String },
    Delete(String),
}

/// Client wrapper that records every mutation in order, can fail the
/// mutation of one chosen path, and can make its directory servers report
/// `FollowLink` on every listing.
pub struct RecordingClient<C> {
    inner: C,
    mutations: Mutex<Vec<Mutation>>,
    fail_on: Option<PathName>,
    follow_link_listings: bool,
}

impl<C: Client> RecordingClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            mutations: Mutex::new(Vec::new()),
            fail_on: None,
            follow_link_listings: false,
        }
    }

    /// Fail any mutation whose target is `name` with a permission error.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.fail_on = Some(p(name));
        self
    }

    /// Report `FollowLink` alongside the real entries for every listing.
    pub fn with_follow_link_listings(mut self) -> Self {
        self.follow_link_listings = true;
        self
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.mutations.lock().unwrap().clone()
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn check(&self, target: &PathName, mutation: Mutation) -> Result<(), NamespaceError> {
        if self.fail_on.as_ref() == Some(target) {
            return Err(NamespaceError::Permission(target.clone()));
        }
        self.mutations.lock().unwrap().push(mutation);
        Ok(())
    }
}

impl<C: Client> Client for RecordingClient<C> {
    fn user(&self) -> &UserName {
        self.inner.user()
    }

    fn lookup(&self, name: &PathName, follow_final: bool) -> Result<DirEntry, NamespaceError> {
        self.inner.lookup(name, follow_final)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<DirEntry>, NamespaceError> {
        self.inner.glob(pattern)
    }

    fn make_directory(&self, name: &PathName) -> Result<DirEntry, NamespaceError> {
        self.check(name, Mutation::MakeDirectory(name.to_string()))?;
        self.inner.make_directory(name)
    }

    fn delete(&self, name: &PathName) -> Result<(), NamespaceError> {
        self.check(name, Mutation::Delete(name.to_string()))?;
        self.inner.delete(name)
    }

    fn put(&self, name: &PathName, data: &[u8]) -> Result<DirEntry, NamespaceError> {
        self.inner.put(name, data)
    }

    fn get(&self, name: &PathName) -> Result<Vec<u8>, NamespaceError> {
        self.inner.get(name)
    }

    fn put_duplicate(&self, src: &PathName, dst: &PathName) -> Result<DirEntry, NamespaceError> {
        self.check(
            dst,
            Mutation::PutDuplicate {
                src: src.to_string(),
                dst: dst.to_string(),
            },
        )?;
        self.inner.put_duplicate(src, dst)
    }

    fn put_link(&self, target: &PathName, dst: &PathName) -> Result<DirEntry, NamespaceError> {
        self.check(
            dst,
            Mutation::PutLink {
                target: target.to_string(),
                dst: dst.to_string(),
            },
        )?;
        self.inner.put_link(target, dst)
    }

    fn dir_server(&self, name: &PathName) -> Result<Arc<dyn DirServer>, NamespaceError> {
        let server = self.inner.dir_server(name)?;
        if self.follow_link_listings {
            Ok(Arc::new(FollowLinkDirServer {
                inner: server,
                user: self.inner.user().clone(),
            }))
        } else {
            Ok(server)
        }
    }
}

/// Directory server that returns its real listing inside a `FollowLink` error.
struct FollowLinkDirServer {
    inner: Arc<dyn DirServer>,
    user: UserName,
}

impl DirServer for FollowLinkDirServer {
    fn glob(&self, pattern: &str) -> Result<Vec<DirEntry>, NamespaceError> {
        let entries = self.inner.glob(pattern)?;
        let link = DirEntry::link(
            p("ann@example.com/elsewhere"),
            p("bob@example.com/"),
            self.user.clone(),
        );
        Err(NamespaceError::FollowLink {
            link: Box::new(link),
            entries,
        })
    }
}
