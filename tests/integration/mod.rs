//! Integration tests for the upspin-ui namespace client, tree operations,
//! browser backend and CLI

mod browser_api;
mod cli_commands;
mod config_integration;
mod sled_namespace;
pub mod test_utils;
