//! Reader for the JSON app-settings file downloaded from the Box developer console.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors reading an app-settings file.
#[derive(Debug, Error)]
pub enum AppSettingsError {
    #[error("failed to read app settings {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse app settings {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The parts of the app-settings file this tool uses.
///
/// Key material for JWT auth (`appAuth`) is present in the file but ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BoxAppSettings {
    #[serde(rename = "boxAppSettings")]
    pub app: AppCredentials,

    #[serde(rename = "enterpriseID", default)]
    pub enterprise_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppCredentials {
    #[serde(rename = "clientID")]
    pub client_id: String,

    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

impl BoxAppSettings {
    /// Load app settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, AppSettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| AppSettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| AppSettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
