//! CLI route: single route table and run context. Dispatches to the namespace
//! client, tree operations and presentation.

use crate::cli::help::{command_name, needs_user};
use crate::cli::parse::Commands;
use crate::cli::presentation::{format_entries_json, format_entries_text, format_init_summary};
use crate::client::Client;
use crate::config::{to_toml, ConfigLoader, UiConfig};
use crate::error::{ApiError, NamespaceError};
use crate::namespace::LocalClient;
use crate::path::{all_files_glob, PathName, UserName};
use crate::store::SledStore;
use crate::treeop::TreeOp;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn};

/// Runtime context for CLI execution: loaded configuration and the opened
/// namespace store.
pub struct RunContext {
    config: UiConfig,
    config_path: Option<PathBuf>,
    store_path: PathBuf,
    store: Arc<SledStore>,
}

impl RunContext {
    /// Load configuration (from `config_path` when given), apply the user and
    /// store overrides, and open the store.
    pub fn new(
        config_path: Option<PathBuf>,
        user: Option<String>,
        store_path: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let mut config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        if user.is_some() {
            config.user_name = user;
        }
        if store_path.is_some() {
            config.storage.store_path = store_path;
        }
        Self::from_config(config, config_path)
    }

    /// Context for `init`: the config file it will write need not exist yet.
    pub fn for_init(
        config_path: Option<PathBuf>,
        store_path: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let target = config_path
            .clone()
            .or_else(ConfigLoader::global_config_path);
        let mut config = match target {
            Some(ref path) if path.exists() => ConfigLoader::load_from_file(path)?,
            _ => ConfigLoader::load_defaults()?,
        };
        if store_path.is_some() {
            config.storage.store_path = store_path;
        }
        Self::from_config(config, config_path)
    }

    /// Open the store named by an already loaded configuration.
    pub fn from_config(config: UiConfig, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let store_path = config.storage.resolve_store_path()?;
        std::fs::create_dir_all(&store_path)?;
        let store = Arc::new(SledStore::new(&store_path)?);
        info!(store = %store_path.display(), "Opened namespace store");
        Ok(Self {
            config,
            config_path,
            store_path,
            store,
        })
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Namespace client acting as the configured user.
    pub fn client(&self) -> Result<LocalClient<SledStore>, ApiError> {
        let user = self.config.user()?.ok_or(ApiError::NoConfiguration)?;
        Ok(LocalClient::new(Arc::clone(&self.store), user)
            .with_block_size(self.config.storage.block_size))
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let span = info_span!("command", command = command_name(command));
        let _enter = span.enter();
        let started = Instant::now();

        let result = if needs_user(command) {
            self.client()
                .and_then(|client| self.execute_namespace(&client, command))
        } else {
            self.execute_local(command)
        };
        let result = result.and_then(|out| {
            self.store.flush()?;
            Ok(out)
        });

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(elapsed_ms, "Command completed"),
            Err(e) => warn!(elapsed_ms, error = %e, "Command failed"),
        }
        result
    }

    fn execute_local(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Init { user, force } => self.init(user, *force),
            Commands::Config { path: true } => ConfigLoader::global_config_path()
                .map(|p| p.display().to_string())
                .ok_or_else(|| {
                    ApiError::ConfigError("cannot determine config directory".to_string())
                }),
            Commands::Config { path: false } => to_toml(&self.config),
            _ => Err(ApiError::BadRequest(format!(
                "{} needs a namespace client",
                command_name(command)
            ))),
        }
    }

    fn execute_namespace(
        &self,
        client: &LocalClient<SledStore>,
        command: &Commands,
    ) -> Result<String, ApiError> {
        match command {
            Commands::Ls { path, format } => {
                let entry = client.lookup(&PathName::from(path.as_str()), true)?;
                let entries = if entry.is_dir() {
                    client.glob(&all_files_glob(&entry.name))?
                } else {
                    vec![entry]
                };
                if format == "json" {
                    format_entries_json(&entries)
                } else {
                    Ok(format_entries_text(&entries))
                }
            }
            Commands::Mkdir { path } => {
                let entry = client.make_directory(&PathName::from(path.as_str()))?;
                Ok(format!("Created {}", entry.name))
            }
            Commands::Cp { paths } => {
                let paths: Vec<PathName> = paths.iter().map(|p| PathName::from(p.as_str())).collect();
                let (dst, srcs) = paths
                    .split_last()
                    .ok_or_else(|| ApiError::BadRequest("cp needs a destination".to_string()))?;
                TreeOp::new(client).copy(dst, srcs)?;
                Ok(format!("Copied {} item(s) into {}", srcs.len(), dst))
            }
            Commands::Rm { paths } => {
                let paths: Vec<PathName> = paths.iter().map(|p| PathName::from(p.as_str())).collect();
                TreeOp::new(client).delete(&paths)?;
                Ok(format!("Removed {} item(s)", paths.len()))
            }
            Commands::Put { path, file } => {
                let data = std::fs::read(file)?;
                let entry = client.put(&PathName::from(path.as_str()), &data)?;
                Ok(format!("Wrote {} ({} bytes)", entry.name, entry.size()))
            }
            Commands::Get { path, out } => {
                let data = client.get(&PathName::from(path.as_str()))?;
                match out {
                    Some(out) => {
                        std::fs::write(out, &data)?;
                        Ok(format!("Wrote {} bytes to {}", data.len(), out.display()))
                    }
                    None => Ok(String::from_utf8_lossy(&data).into_owned()),
                }
            }
            Commands::Ln { target, link } => {
                let entry = client.put_link(
                    &PathName::from(target.as_str()),
                    &PathName::from(link.as_str()),
                )?;
                Ok(format!("Linked {} -> {}", entry.name, target))
            }
            Commands::Init { .. } | Commands::Config { .. } => self.execute_local(command),
        }
    }

    /// Write a configuration for `user` and create the user's root directory.
    fn init(&self, user: &str, force: bool) -> Result<String, ApiError> {
        let user = UserName::parse(user)?;
        let config_path = self
            .config_path
            .clone()
            .or_else(ConfigLoader::global_config_path)
            .ok_or_else(|| ApiError::ConfigError("cannot determine config directory".to_string()))?;
        if config_path.exists() && !force {
            return Err(ApiError::ConfigError(format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            )));
        }

        let mut config = self.config.clone();
        config.user_name = Some(user.to_string());
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, to_toml(&config)?)?;

        let client = LocalClient::new(Arc::clone(&self.store), user.clone())
            .with_block_size(config.storage.block_size);
        match client.make_directory(&user.root()) {
            Ok(_) | Err(NamespaceError::Exists(_)) => {}
            Err(e) => return Err(e.into()),
        }
        info!(user = %user, config = %config_path.display(), "Initialized user");
        Ok(format_init_summary(
            user.as_str(),
            &config_path,
            &self.store_path,
        ))
    }
}
