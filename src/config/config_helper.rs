//! Configuration helper for interpreting config values.
//!
//! The `ConfigHelper` wraps a `Config` and provides methods for interpreting
//! configuration values, such as resolving which credentials to use.

use std::sync::Arc;

use reqwest::Client;

use super::{Config, ConfigError, Result, SubjectType};
use crate::remote::{BoxAppSettings, BoxClientConfig, ClientCredentials, StaticToken, Subject, TokenProvider};

/// The credentials a run authenticates with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    DeveloperToken(String),
    ClientCredentials {
        client_id: String,
        client_secret: String,
        subject: Subject,
    },
}

/// Helper for interpreting configuration values.
#[derive(Debug, Clone)]
pub struct ConfigHelper {
    config: Config,
}

impl ConfigHelper {
    /// Create a new ConfigHelper wrapping the given config.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get a reference to the underlying config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the helper and return the underlying config.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Work out which credentials to use.
    ///
    /// A developer token wins. Otherwise the client id and secret come from
    /// the `[box]` section, or failing that from the app-settings file. The
    /// subject id defaults to the enterprise id from the app-settings file
    /// when the subject type is `enterprise`.
    pub fn credentials(&self) -> Result<Credentials> {
        let box_api = &self.config.box_api;

        if let Some(token) = &box_api.developer_token {
            return Ok(Credentials::DeveloperToken(token.clone()));
        }

        let settings = match &box_api.credentials_file {
            Some(path) => Some(BoxAppSettings::load(path)?),
            None => None,
        };

        let (client_id, client_secret) = match (&box_api.client_id, &box_api.client_secret, &settings) {
            (Some(id), Some(secret), _) => (id.clone(), secret.clone()),
            (_, _, Some(settings)) => (settings.app.client_id.clone(), settings.app.client_secret.clone()),
            _ => return Err(ConfigError::MissingCredentials),
        };

        let subject_id = match (&box_api.subject_id, box_api.subject_type, &settings) {
            (Some(id), _, _) => id.clone(),
            (None, SubjectType::Enterprise, Some(settings)) => settings
                .enterprise_id
                .clone()
                .ok_or_else(missing_subject_id)?,
            _ => return Err(missing_subject_id()),
        };

        let subject = match box_api.subject_type {
            SubjectType::Enterprise => Subject::Enterprise(subject_id),
            SubjectType::User => Subject::User(subject_id),
        };

        Ok(Credentials::ClientCredentials {
            client_id,
            client_secret,
            subject,
        })
    }

    /// Build the token provider for the resolved credentials.
    pub fn token_provider(&self, http: &Client) -> Result<Arc<dyn TokenProvider>> {
        Ok(match self.credentials()? {
            Credentials::DeveloperToken(token) => Arc::new(StaticToken::new(token)),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
                subject,
            } => Arc::new(ClientCredentials::new(
                http.clone(),
                self.config.box_api.token_url.clone(),
                client_id,
                client_secret,
                subject,
            )),
        })
    }

    /// API endpoint and paging settings for the client.
    pub fn box_client_config(&self) -> BoxClientConfig {
        BoxClientConfig::default()
            .with_api_url(self.config.box_api.api_url.clone())
            .with_page_size(self.config.box_api.page_size)
    }
}

fn missing_subject_id() -> ConfigError {
    ConfigError::MissingRequiredField {
        section: "box".to_string(),
        field: "subject_id".to_string(),
    }
}

impl From<Config> for ConfigHelper {
    fn from(config: Config) -> Self {
        Self::new(config)
    }
}
