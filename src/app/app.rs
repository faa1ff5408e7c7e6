//! Top-level application component.
//!
//! The [`App`] owns the resolved configuration and constructs the one remote
//! client a run uses.

use std::fs::File;
use std::path::{Path, PathBuf};

use reqwest::Client;
use thiserror::Error;
use tracing::warn;

use crate::config::{read_config, ConfigError, ConfigHelper, ConfigSource};
use crate::migrate::{read_mapping_file, MappingError, NameMatching, RunMigrationOptions};
use crate::remote::{BoxClient, RemoteError, TokenProvider};
use crate::report::{MigrationLog, ReportError};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during App operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The mapping file could not be read.
    #[error("{0}")]
    Mapping(#[from] MappingError),

    /// The credentials were rejected or no token could be obtained.
    #[error("authentication failed: {0}")]
    Auth(#[from] RemoteError),

    /// The migration log could not be created.
    #[error("failed to create migration log: {0}")]
    Log(#[from] ReportError),

    /// Neither name matching nor a mapping file was configured.
    #[error("nothing to migrate: {0}")]
    NothingToMigrate(String),
}

/// Result type for App operations.
pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// Context Types
// =============================================================================

/// Context for creating an App.
#[derive(Default)]
pub struct AppContext {
    /// Source for configuration files.
    pub config_source: ConfigSource,
}

/// Command-line choices that take precedence over the `[migration]` section.
#[derive(Debug, Clone, Default)]
pub struct AppMigrationContext {
    pub origin_folder_id: Option<String>,
    pub accounts_folder_id: Option<String>,
    pub mapping_file: Option<PathBuf>,
    /// Skip name matching and migrate only the mapped folders.
    pub mapping_only: bool,
}

// =============================================================================
// App
// =============================================================================

/// The top-level application component.
///
/// Holds the configuration for the whole run. Remote access goes through the
/// client returned by [`App::connect`], which callers pass explicitly to the
/// migration functions.
pub struct App {
    config: ConfigHelper,
}

impl App {
    /// Create a new App with the given context.
    pub fn new(ctx: AppContext) -> Result<Self> {
        let config_result = read_config(&ctx.config_source)?;
        for warning in &config_result.warnings {
            warn!("{}", warning);
        }

        Ok(Self {
            config: ConfigHelper::new(config_result.config),
        })
    }

    /// Get the configuration helper.
    pub fn config(&self) -> &ConfigHelper {
        &self.config
    }

    /// Build the Box client for this run.
    ///
    /// Credentials are resolved and one access token is fetched here, so bad
    /// credentials fail before any output is created. The token is cached by
    /// the provider and reused by the first requests.
    pub async fn connect(&self) -> Result<BoxClient> {
        let http = Client::new();
        let tokens = self.config.token_provider(&http)?;
        tokens.access_token().await?;
        Ok(BoxClient::with_client(
            http,
            self.config.box_client_config(),
            tokens,
        ))
    }

    /// Decide where migration units come from and load the mapping file.
    pub fn migration_options(&self, ctx: &AppMigrationContext) -> Result<RunMigrationOptions> {
        let configured = &self.config.config().migration;
        let origin = ctx
            .origin_folder_id
            .clone()
            .or_else(|| configured.origin_folder_id.clone());
        let accounts = ctx
            .accounts_folder_id
            .clone()
            .or_else(|| configured.accounts_folder_id.clone());
        let mapping_file = ctx
            .mapping_file
            .clone()
            .or_else(|| configured.mapping_file.clone());

        let name_matching = if ctx.mapping_only {
            None
        } else {
            match (origin, accounts) {
                (Some(origin_folder_id), Some(accounts_folder_id)) => Some(NameMatching {
                    origin_folder_id,
                    accounts_folder_id,
                }),
                (Some(_), None) => {
                    return Err(AppError::NothingToMigrate(
                        "origin folder is set but accounts folder is not".to_string(),
                    ))
                }
                (None, Some(_)) => {
                    return Err(AppError::NothingToMigrate(
                        "accounts folder is set but origin folder is not".to_string(),
                    ))
                }
                (None, None) => None,
            }
        };

        let mappings = match &mapping_file {
            Some(path) => read_mapping_file(path)?,
            None => Vec::new(),
        };

        if name_matching.is_none() && mapping_file.is_none() {
            return Err(AppError::NothingToMigrate(
                "set migration.origin_folder_id and migration.accounts_folder_id, or a mapping file"
                    .to_string(),
            ));
        }

        Ok(RunMigrationOptions {
            name_matching,
            mappings,
        })
    }

    /// Create a fresh migration log, never replacing an existing file.
    ///
    /// `directory` and `base_name` override the `[log]` section.
    pub fn create_migration_log(
        &self,
        directory: Option<&Path>,
        base_name: Option<&str>,
    ) -> Result<(PathBuf, MigrationLog<File>)> {
        let log = &self.config.config().log;
        let directory = directory.unwrap_or(&log.directory);
        let base_name = base_name.unwrap_or(&log.base_name);
        Ok(MigrationLog::create(directory, base_name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(ini: &str) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boxmigrate.ini");
        std::fs::write(&path, ini).unwrap();
        let ctx = AppContext {
            config_source: ConfigSource {
                config_file: Some(path),
                ..ConfigSource::default()
            },
        };
        let app = App::new(ctx).unwrap();
        (dir, app)
    }

    #[test]
    fn test_app_creation() {
        let (_dir, app) = app_with("[log]\nbase_name = nightly\n");
        assert_eq!(app.config().config().log.base_name, "nightly");
    }

    /// A token endpoint on a local port that nothing listens on.
    fn unreachable_token_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}/oauth2/token", port)
    }

    #[tokio::test]
    async fn test_connect_requires_credentials() {
        let (_dir, app) = app_with("");
        assert!(matches!(
            app.connect().await,
            Err(AppError::Config(ConfigError::MissingCredentials))
        ));

        let (_dir, app) = app_with("[box]\ndeveloper_token = dev\n");
        assert!(app.connect().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_fetches_a_token() {
        let (_dir, app) = app_with(&format!(
            "[box]\nclient_id = id\nclient_secret = secret\nsubject_id = 42\ntoken_url = {}\n",
            unreachable_token_url()
        ));
        assert!(matches!(app.connect().await, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_migration_options_from_config() {
        let (_dir, app) = app_with("[migration]\norigin_folder_id = 1\naccounts_folder_id = 2\n");
        let options = app.migration_options(&AppMigrationContext::default()).unwrap();

        assert_eq!(
            options.name_matching,
            Some(NameMatching {
                origin_folder_id: "1".to_string(),
                accounts_folder_id: "2".to_string(),
            })
        );
        assert!(options.mappings.is_empty());
    }

    #[test]
    fn test_migration_options_cli_overrides_config() {
        let (_dir, app) = app_with("[migration]\norigin_folder_id = 1\naccounts_folder_id = 2\n");
        let ctx = AppMigrationContext {
            origin_folder_id: Some("10".to_string()),
            ..AppMigrationContext::default()
        };
        let options = app.migration_options(&ctx).unwrap();
        let matching = options.name_matching.unwrap();
        assert_eq!(matching.origin_folder_id, "10");
        assert_eq!(matching.accounts_folder_id, "2");
    }

    #[test]
    fn test_migration_options_mapping_only() {
        let (dir, app) = app_with("[migration]\norigin_folder_id = 1\naccounts_folder_id = 2\n");
        let mapping = dir.path().join("mapping.csv");
        std::fs::write(&mapping, "name,origin,destination\nAcme,111,56475663001\n").unwrap();

        let ctx = AppMigrationContext {
            mapping_file: Some(mapping),
            mapping_only: true,
            ..AppMigrationContext::default()
        };
        let options = app.migration_options(&ctx).unwrap();

        assert!(options.name_matching.is_none());
        assert_eq!(options.mappings.len(), 1);
        assert_eq!(options.mappings[0].origin_id, "111");
    }

    #[test]
    fn test_migration_options_need_a_source() {
        let (_dir, app) = app_with("");
        assert!(matches!(
            app.migration_options(&AppMigrationContext::default()),
            Err(AppError::NothingToMigrate(_))
        ));

        let (_dir, app) = app_with("[migration]\norigin_folder_id = 1\n");
        assert!(matches!(
            app.migration_options(&AppMigrationContext::default()),
            Err(AppError::NothingToMigrate(_))
        ));
    }

    #[test]
    fn test_create_migration_log() {
        let (dir, app) = app_with("");
        let log_dir = dir.path().join("logs");

        let (first, _log) = app.create_migration_log(Some(&log_dir), None).unwrap();
        let (second, _log) = app.create_migration_log(Some(&log_dir), None).unwrap();

        assert_eq!(first, log_dir.join("folder-migration-log.csv"));
        assert_eq!(second, log_dir.join("folder-migration-log-1.csv"));
    }
}
