//! Configuration system for parley.
//!
//! Provides TOML-based configuration with:
//! - Config file layering (XDG user config + project-local overrides)
//! - Environment overrides for the service, assistant and instructions
//! - API key resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod resolver;
pub mod secrets;
pub mod types;

pub use discovery::{
    load_config, load_config_file, load_config_with_options, save_config, xdg_config_dir,
    xdg_config_path, ConfigSource, LoadedConfig,
};
pub use error::{ConfigError, Result};
pub use resolver::{resolve_service, resolve_service_with, ResolvedService};
pub use secrets::{ResolvedSecret, SecretSource};
pub use types::*;
