/**
 * Configuration access, using hierarchical configuration
 * https://docs.rs/config/latest/config/
 *
 * `load` layers the sources the same way for every application:
 * 1. First logconf.yaml is read
 * 2. Then logconf.{environment}.yaml is read
 * 3. Then logconf.local.yaml is read (this is normally used for dev and not checked in git)
 * 4. Finally, environment variables are read (LOGCONF_LOGGER__LEVEL=info sets logger.level)
 *
 * The configurator itself only needs the `ConfigSource` view, which is
 * implemented here for `config::Config`.
 */
use config::{Config, ConfigError, Environment, File, FileFormat, Value};
use std::env;

pub mod formatter_type;
pub mod hook_type;
pub mod level_type;
pub mod options;
pub mod output_type;

use hook_type::HookDescriptor;
use options::OptionMap;

/// Environment variable selecting the environment-specific config file.
pub const ENVIRONMENT_VAR: &str = "LOGCONF_ENVIRONMENT";

/**
 * Read-only view over a nested key/value tree addressed by dotted paths.
 */
pub trait ConfigSource {
    /// Returns true if anything is stored at `key`.
    fn is_set(&self, key: &str) -> bool;

    /// Reads a scalar as a string.
    fn string(&self, key: &str) -> Result<String, ConfigError>;

    /// Reads a table as a flat string map.
    fn string_map(&self, key: &str) -> Result<OptionMap, ConfigError>;

    /// Decodes a list of hook descriptors.
    fn hooks(&self, key: &str) -> Result<Vec<HookDescriptor>, ConfigError>;
}

impl ConfigSource for Config {
    fn is_set(&self, key: &str) -> bool {
        self.get::<Value>(key).is_ok()
    }

    fn string(&self, key: &str) -> Result<String, ConfigError> {
        self.get_string(key)
    }

    fn string_map(&self, key: &str) -> Result<OptionMap, ConfigError> {
        self.get_table(key).map(OptionMap::from_table)
    }

    fn hooks(&self, key: &str) -> Result<Vec<HookDescriptor>, ConfigError> {
        self.get::<Vec<HookDescriptor>>(key)
    }
}

/**
 * Loads the layered configuration described at the top of this module.
 *
 * @param extra Optional file layered on top of the default files (required if given).
 * @return The merged configuration tree.
 */
pub fn load(extra: Option<&str>) -> Result<Config, ConfigError> {
    let run_mode = env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "production".into());

    let mut builder = Config::builder()
        // default config file
        .add_source(File::with_name("logconf.yaml").required(false))
        // environment-based config file
        .add_source(File::with_name(&format!("logconf.{run_mode}.yaml")).required(false))
        // local config file (don't check this into source control)
        .add_source(File::with_name("logconf.local.yaml").required(false));

    if let Some(path) = extra {
        builder = builder.add_source(File::with_name(path).required(true));
    }

    builder
        .add_source(
            Environment::with_prefix("LOGCONF")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
}

/**
 * Builds a configuration tree from inline text.
 */
pub fn from_str(text: &str, format: FileFormat) -> Result<Config, ConfigError> {
    Config::builder()
        .add_source(File::from_str(text, format))
        .build()
}
