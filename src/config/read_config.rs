//! Configuration file reading and parsing.
//!
//! This module handles locating, reading, and parsing INI-format configuration files,
//! with support for layered overrides.

use std::env;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use thiserror::Error;

use super::{BoxApiConfig, Config, LogConfig, MigrationConfig, SubjectType};
use crate::remote::{AppSettingsError, DEFAULT_API_URL, MAX_PAGE_SIZE};

// =============================================================================
// Constants - Default Values
// =============================================================================

const DEFAULT_TOKEN_URL: &str = "https://api.box.com/oauth2/token";
const DEFAULT_PAGE_SIZE: u32 = MAX_PAGE_SIZE;
const DEFAULT_LOG_DIRECTORY: &str = ".";
const DEFAULT_LOG_BASE_NAME: &str = "folder-migration-log";

const ENV_CONFIG_FILE: &str = "BOXMIGRATE_CONFIG_FILE";
const DEFAULT_CONFIG_FILENAME: &str = ".boxmigrate";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading or interpreting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid integer '{value}': {source}")]
    InvalidInteger {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid value '{value}' for key '{key}': {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("invalid override key '{key}': {message}")]
    InvalidOverrideKey { key: String, message: String },

    #[error("no Box credentials configured: set box.developer_token, box.client_id and box.client_secret, or box.credentials_file")]
    MissingCredentials,

    #[error("missing required field '{field}' in section '{section}'")]
    MissingRequiredField { section: String, field: String },

    #[error(transparent)]
    AppSettings(#[from] AppSettingsError),
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate and layer configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path from CLI. If specified and doesn't exist, error.
    /// If None, fall back to BOXMIGRATE_CONFIG_FILE env var, then ~/.boxmigrate.
    pub config_file: Option<PathBuf>,

    /// Additional override config file (layered on top of base config).
    pub override_file: Option<PathBuf>,

    /// Individual key=value overrides (applied last).
    /// Keys use dot-notation: "box.page_size", "log.directory"
    pub overrides: Vec<(String, String)>,
}

// =============================================================================
// Value Parsing
// =============================================================================

fn parse_page_size(key: &str, value: &str) -> Result<u32> {
    let size: u32 = value.trim().parse().map_err(|e| ConfigError::InvalidInteger {
        value: value.to_string(),
        source: e,
    })?;
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: format!("must be between 1 and {}", MAX_PAGE_SIZE),
        });
    }
    Ok(size)
}

fn parse_subject_type(key: &str, value: &str) -> Result<SubjectType> {
    SubjectType::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: "expected 'enterprise' or 'user'".to_string(),
    })
}

/// Treat blank values as unset.
fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// =============================================================================
// Config File Resolution
// =============================================================================

/// Information about how the config file was resolved.
#[derive(Debug)]
pub struct ResolvedConfigFile {
    /// The path to the config file, if one was found.
    pub path: Option<PathBuf>,
    /// Warning message if env var pointed to nonexistent file.
    pub warning: Option<String>,
}

/// Resolve which config file to use based on the ConfigSource and environment.
fn resolve_config_file(source: &ConfigSource) -> Result<ResolvedConfigFile> {
    // If explicit path provided, it must exist
    if let Some(ref path) = source.config_file {
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path.clone()),
                warning: None,
            });
        } else {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
    }

    if let Ok(env_path) = env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path),
                warning: None,
            });
        } else {
            // Warn but continue with defaults
            return Ok(ResolvedConfigFile {
                path: None,
                warning: Some(format!(
                    "config file specified by {} does not exist: {}",
                    ENV_CONFIG_FILE, env_path
                )),
            });
        }
    }

    if let Some(home) = home_dir() {
        let default_path = home.join(DEFAULT_CONFIG_FILENAME);
        if default_path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(default_path),
                warning: None,
            });
        }
    }

    Ok(ResolvedConfigFile {
        path: None,
        warning: None,
    })
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

// =============================================================================
// Default Config
// =============================================================================

/// Create a Config with all default values.
fn default_config() -> Config {
    Config {
        box_api: BoxApiConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            developer_token: None,
            client_id: None,
            client_secret: None,
            credentials_file: None,
            subject_type: SubjectType::Enterprise,
            subject_id: None,
            page_size: DEFAULT_PAGE_SIZE,
        },
        migration: MigrationConfig::default(),
        log: LogConfig {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            base_name: DEFAULT_LOG_BASE_NAME.to_string(),
        },
    }
}

// =============================================================================
// INI Parsing
// =============================================================================

const BOX_KEYS: [&str; 9] = [
    "api_url",
    "token_url",
    "developer_token",
    "client_id",
    "client_secret",
    "credentials_file",
    "subject_type",
    "subject_id",
    "page_size",
];
const MIGRATION_KEYS: [&str; 3] = ["origin_folder_id", "accounts_folder_id", "mapping_file"];
const LOG_KEYS: [&str; 2] = ["directory", "base_name"];

/// Apply an INI file's contents to a Config, layering on top of existing values.
///
/// Only keys present in the file change the config. Unknown sections and keys
/// are ignored.
fn apply_ini_to_config(config: &mut Config, ini: &Ini) -> Result<()> {
    for (section, keys) in [
        ("box", &BOX_KEYS[..]),
        ("migration", &MIGRATION_KEYS[..]),
        ("log", &LOG_KEYS[..]),
    ] {
        for key in keys {
            if let Some(value) = ini.get(section, key) {
                apply_setting(config, section, key, &value)?;
            }
        }
    }
    Ok(())
}

/// Load and parse an INI file.
fn load_ini(path: &Path) -> Result<Ini> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e,
    })?;
    Ok(ini)
}

// =============================================================================
// Setting Application
// =============================================================================

/// Apply a single key=value override to the config.
fn apply_override(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key.split_once('.') {
        Some((section, param)) if !param.contains('.') => {
            apply_setting(config, section, param, value)
        }
        _ => Err(ConfigError::InvalidOverrideKey {
            key: key.to_string(),
            message: "unrecognized key format".to_string(),
        }),
    }
}

fn apply_setting(config: &mut Config, section: &str, param: &str, value: &str) -> Result<()> {
    match section {
        "box" => apply_box_setting(&mut config.box_api, param, value),
        "migration" => apply_migration_setting(&mut config.migration, param, value),
        "log" => apply_log_setting(&mut config.log, param, value),
        _ => Err(ConfigError::InvalidOverrideKey {
            key: format!("{}.{}", section, param),
            message: "unknown section".to_string(),
        }),
    }
}

fn apply_box_setting(box_api: &mut BoxApiConfig, param: &str, value: &str) -> Result<()> {
    match param {
        "api_url" => box_api.api_url = value.trim().to_string(),
        "token_url" => box_api.token_url = value.trim().to_string(),
        "developer_token" => box_api.developer_token = non_empty(value),
        "client_id" => box_api.client_id = non_empty(value),
        "client_secret" => box_api.client_secret = non_empty(value),
        "credentials_file" => box_api.credentials_file = non_empty(value).map(PathBuf::from),
        "subject_type" => box_api.subject_type = parse_subject_type("box.subject_type", value)?,
        "subject_id" => box_api.subject_id = non_empty(value),
        "page_size" => box_api.page_size = parse_page_size("box.page_size", value)?,
        _ => return Err(unknown_parameter("box", param)),
    }
    Ok(())
}

fn apply_migration_setting(migration: &mut MigrationConfig, param: &str, value: &str) -> Result<()> {
    match param {
        "origin_folder_id" => migration.origin_folder_id = non_empty(value),
        "accounts_folder_id" => migration.accounts_folder_id = non_empty(value),
        "mapping_file" => migration.mapping_file = non_empty(value).map(PathBuf::from),
        _ => return Err(unknown_parameter("migration", param)),
    }
    Ok(())
}

fn apply_log_setting(log: &mut LogConfig, param: &str, value: &str) -> Result<()> {
    match param {
        "directory" => log.directory = PathBuf::from(value.trim()),
        "base_name" => {
            log.base_name = non_empty(value).ok_or_else(|| ConfigError::InvalidValue {
                key: "log.base_name".to_string(),
                value: value.to_string(),
                message: "must not be empty".to_string(),
            })?
        }
        _ => return Err(unknown_parameter("log", param)),
    }
    Ok(())
}

fn unknown_parameter(section: &str, param: &str) -> ConfigError {
    ConfigError::InvalidOverrideKey {
        key: format!("{}.{}", section, param),
        message: "unknown parameter".to_string(),
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

/// Result of reading configuration, including any warnings.
#[derive(Debug)]
pub struct ConfigResult {
    /// The parsed configuration.
    pub config: Config,
    /// Any warnings generated during config loading.
    pub warnings: Vec<String>,
}

/// Read and parse configuration from the specified sources.
///
/// Configuration is layered in this order:
/// 1. Built-in defaults
/// 2. Base config file (from CLI, env var, or ~/.boxmigrate)
/// 3. Override config file (if specified)
/// 4. Individual overrides (applied last)
pub fn read_config(source: &ConfigSource) -> Result<ConfigResult> {
    let mut warnings = Vec::new();

    let mut config = default_config();

    let resolved = resolve_config_file(source)?;
    if let Some(warning) = resolved.warning {
        warnings.push(warning);
    }
    if let Some(ref path) = resolved.path {
        let ini = load_ini(path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    if let Some(ref override_path) = source.override_file {
        if !override_path.exists() {
            return Err(ConfigError::FileNotFound(override_path.clone()));
        }
        let ini = load_ini(override_path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    for (key, value) in &source.overrides {
        apply_override(&mut config, key, value)?;
    }

    Ok(ConfigResult { config, warnings })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert_eq!(config.box_api.api_url, "https://api.box.com/2.0");
        assert_eq!(config.box_api.token_url, "https://api.box.com/oauth2/token");
        assert_eq!(config.box_api.page_size, 1000);
        assert_eq!(config.box_api.subject_type, SubjectType::Enterprise);
        assert!(config.box_api.developer_token.is_none());
        assert_eq!(config.log.directory, PathBuf::from("."));
        assert_eq!(config.log.base_name, "folder-migration-log");
        assert!(config.migration.origin_folder_id.is_none());
    }

    #[test]
    fn test_apply_override_box() {
        let mut config = default_config();
        apply_override(&mut config, "box.page_size", "250").unwrap();
        assert_eq!(config.box_api.page_size, 250);

        apply_override(&mut config, "box.subject_type", "User").unwrap();
        assert_eq!(config.box_api.subject_type, SubjectType::User);

        apply_override(&mut config, "box.developer_token", "abc").unwrap();
        assert_eq!(config.box_api.developer_token.as_deref(), Some("abc"));

        apply_override(&mut config, "box.developer_token", "  ").unwrap();
        assert!(config.box_api.developer_token.is_none());
    }

    #[test]
    fn test_apply_override_rejects_bad_values() {
        let mut config = default_config();
        assert!(matches!(
            apply_override(&mut config, "box.page_size", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            apply_override(&mut config, "box.page_size", "1001"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            apply_override(&mut config, "box.page_size", "many"),
            Err(ConfigError::InvalidInteger { .. })
        ));
        assert!(matches!(
            apply_override(&mut config, "box.subject_type", "group"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            apply_override(&mut config, "log.base_name", ""),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_apply_override_unknown_keys() {
        let mut config = default_config();
        assert!(apply_override(&mut config, "box", "x").is_err());
        assert!(apply_override(&mut config, "box.nope", "x").is_err());
        assert!(apply_override(&mut config, "cache.path", "x").is_err());
        assert!(apply_override(&mut config, "box.page_size.extra", "1").is_err());
    }

    #[test]
    fn test_parse_ini_config() {
        let mut ini = Ini::new();
        ini.read(
            r#"
[box]
developer_token = dev-123
page_size = 500

[migration]
origin_folder_id = 65741957001
accounts_folder_id = 56475663001
mapping_file = /data/mapping.csv

[log]
directory = /var/log/migration
base_name = run

[unrelated]
key = value
"#
            .to_string(),
        )
        .unwrap();

        let mut config = default_config();
        apply_ini_to_config(&mut config, &ini).unwrap();

        assert_eq!(config.box_api.developer_token.as_deref(), Some("dev-123"));
        assert_eq!(config.box_api.page_size, 500);
        assert_eq!(config.box_api.api_url, DEFAULT_API_URL);
        assert_eq!(
            config.migration.origin_folder_id.as_deref(),
            Some("65741957001")
        );
        assert_eq!(
            config.migration.accounts_folder_id.as_deref(),
            Some("56475663001")
        );
        assert_eq!(
            config.migration.mapping_file,
            Some(PathBuf::from("/data/mapping.csv"))
        );
        assert_eq!(config.log.directory, PathBuf::from("/var/log/migration"));
        assert_eq!(config.log.base_name, "run");
    }

    #[test]
    fn test_read_config_layers() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.ini");
        std::fs::write(
            &base,
            "[box]\npage_size = 100\nclient_id = id\n[log]\nbase_name = base\n",
        )
        .unwrap();
        let overrides = dir.path().join("override.ini");
        std::fs::write(&overrides, "[box]\npage_size = 200\n").unwrap();

        let source = ConfigSource {
            config_file: Some(base),
            override_file: Some(overrides),
            overrides: vec![("log.base_name".to_string(), "cli".to_string())],
        };
        let result = read_config(&source).unwrap();

        assert_eq!(result.config.box_api.page_size, 200);
        assert_eq!(result.config.box_api.client_id.as_deref(), Some("id"));
        assert_eq!(result.config.log.base_name, "cli");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_read_config_missing_explicit_file() {
        let source = ConfigSource {
            config_file: Some(PathBuf::from("/nonexistent/boxmigrate.ini")),
            ..ConfigSource::default()
        };
        assert!(matches!(
            read_config(&source),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_read_config_missing_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.ini");
        std::fs::write(&base, "").unwrap();

        let source = ConfigSource {
            config_file: Some(base),
            override_file: Some(dir.path().join("missing.ini")),
            overrides: Vec::new(),
        };
        assert!(matches!(
            read_config(&source),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
