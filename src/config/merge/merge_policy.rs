//! Merge rules: defaults applied beneath every other source.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("default_path", crate::config::DEFAULT_PATH)?
        .set_default("http_address", crate::config::DEFAULT_HTTP_ADDRESS)?
        .set_default(
            "storage.block_size",
            crate::namespace::DEFAULT_BLOCK_SIZE as u64,
        )
}
