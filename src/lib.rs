//! upspin-ui
//!
//! Namespace browser backend for Upspin-style `user@domain/path` trees:
//! a local namespace client over sled or memory stores, recursive copy and
//! delete of whole trees, the browser request handlers, and a CLI.

pub mod browser;
pub mod cli;
pub mod client;
pub mod config;
pub mod entry;
pub mod error;
pub mod logging;
pub mod namespace;
pub mod path;
pub mod store;
pub mod treeop;
