//! Configuration System
//!
//! Layered configuration for the browser backend and the CLI. Sources are
//! merged in order, later ones winning: built-in defaults, the global
//! config file (or an explicit file), then `UPSPIN_UI__*` environment
//! variables. CLI flags are applied on top by the binary.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::path::{PathName, UserName};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod environment;
    pub mod global_file;
}

pub use sources::environment::ENV_PREFIX;

/// Tree shown in the right-hand browser pane on startup.
pub const DEFAULT_PATH: &str = "augie@upspin.io/";

/// HTTP listen address; must be loopback.
pub const DEFAULT_HTTP_ADDRESS: &str = "localhost:8000";

/// XDG base directory helpers
pub mod xdg {
    use std::path::PathBuf;

    /// Home directory, from $HOME.
    pub fn home_dir() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }

    fn from_env(var: &str) -> Option<PathBuf> {
        std::env::var_os(var)
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
    }

    /// $XDG_CONFIG_HOME, falling back to ~/.config
    pub fn config_home() -> Option<PathBuf> {
        from_env("XDG_CONFIG_HOME").or_else(|| home_dir().map(|h| h.join(".config")))
    }

    /// $XDG_DATA_HOME, falling back to ~/.local/share
    pub fn data_home() -> Option<PathBuf> {
        from_env("XDG_DATA_HOME").or_else(|| home_dir().map(|h| h.join(".local").join("share")))
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// User the namespace client acts as. None until signup has completed.
    #[serde(default)]
    pub user_name: Option<String>,

    /// Tree opened in the right-hand pane
    #[serde(default = "default_path")]
    pub default_path: String,

    /// HTTP listen address for the browser front end
    #[serde(default = "default_http_address")]
    pub http_address: String,

    /// Directory server endpoint, e.g. `remote,dir.example.com:443`
    #[serde(default)]
    pub dir_endpoint: Option<String>,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

fn default_http_address() -> String {
    DEFAULT_HTTP_ADDRESS.to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            user_name: None,
            default_path: default_path(),
            http_address: default_http_address(),
            dir_endpoint: None,
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Storage settings for the local namespace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled database directory (default: $XDG_DATA_HOME/upspin-ui/store)
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Size of stored content blocks in bytes
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

fn default_block_size() -> usize {
    crate::namespace::DEFAULT_BLOCK_SIZE
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            block_size: default_block_size(),
        }
    }
}

impl StorageConfig {
    /// Store path, resolved against the XDG data directory when unset.
    pub fn resolve_store_path(&self) -> Result<PathBuf, ApiError> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        xdg::data_home()
            .map(|dir| dir.join("upspin-ui").join("store"))
            .ok_or_else(|| {
                ApiError::ConfigError(
                    "cannot determine data directory; set storage.store_path".to_string(),
                )
            })
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    User(String),
    Path(String),
    Address(String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::User(msg) => write!(f, "user_name: {}", msg),
            ValidationError::Path(msg) => write!(f, "default_path: {}", msg),
            ValidationError::Address(msg) => write!(f, "http_address: {}", msg),
            ValidationError::Storage(msg) => write!(f, "storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl UiConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(user) = &self.user_name {
            if let Err(e) = UserName::parse(user) {
                errors.push(ValidationError::User(e.to_string()));
            }
        }
        if let Err(e) = PathName::from(self.default_path.as_str()).parse() {
            errors.push(ValidationError::Path(e.to_string()));
        }
        if self.http_address.rsplit_once(':').is_none() {
            errors.push(ValidationError::Address(format!(
                "{:?} is not of the form host:port",
                self.http_address
            )));
        }
        if self.storage.block_size == 0 {
            errors.push(ValidationError::Storage(
                "block_size must be positive".to_string(),
            ));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Configured user, if signup has completed.
    pub fn user(&self) -> Result<Option<UserName>, ApiError> {
        self.user_name
            .as_deref()
            .map(|name| UserName::parse(name).map_err(ApiError::from))
            .transpose()
    }

    /// Reports whether the directory endpoint names a remote server.
    pub fn dir_endpoint_is_remote(&self) -> bool {
        self.dir_endpoint
            .as_deref()
            .is_some_and(|endpoint| endpoint.trim_start().starts_with("remote"))
    }
}

/// Loads [`UiConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from defaults, the global config file, and the environment.
    pub fn load() -> Result<UiConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::environment::add_to_builder(builder);
        Self::finish(builder)
    }

    /// Load from defaults, the given file (which must exist), and the environment.
    pub fn load_from_file(path: &Path) -> Result<UiConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path.to_path_buf()).required(true));
        let builder = sources::environment::add_to_builder(builder);
        Self::finish(builder)
    }

    /// Load from defaults and the environment only, skipping config files.
    pub fn load_defaults() -> Result<UiConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::environment::add_to_builder(builder);
        Self::finish(builder)
    }

    /// Global config file location, if a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<UiConfig, ApiError> {
        let config: UiConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}

/// Render a configuration as TOML.
pub fn to_toml(config: &UiConfig) -> Result<String, ApiError> {
    toml::to_string_pretty(config).map_err(|e| ApiError::ConfigError(e.to_string()))
}
