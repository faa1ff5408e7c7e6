//! Configuration module.

mod config_helper;
mod read_config;
mod types;

pub use config_helper::{ConfigHelper, Credentials};
pub use read_config::{read_config, ConfigError, ConfigResult, ConfigSource, Result};
pub use types::{BoxApiConfig, Config, LogConfig, MigrationConfig, SubjectType};
