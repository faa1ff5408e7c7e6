//! Configuration types for boxmigrate.
//!
//! This module defines the structures used to represent application configuration
//! as parsed from an INI-format config file.

use std::fmt;
use std::path::PathBuf;

// =============================================================================
// Primitive Types
// =============================================================================

/// Whose account the client-credentials grant acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectType {
    #[default]
    Enterprise,
    User,
}

impl SubjectType {
    /// Parse `enterprise` or `user`, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "enterprise" => Some(SubjectType::Enterprise),
            "user" => Some(SubjectType::User),
            _ => None,
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectType::Enterprise => f.write_str("enterprise"),
            SubjectType::User => f.write_str("user"),
        }
    }
}

// =============================================================================
// Config Sections
// =============================================================================

/// [box] section - API endpoints and credentials.
#[derive(Debug, Clone)]
pub struct BoxApiConfig {
    pub api_url: String,
    pub token_url: String,
    /// Short-lived token from the developer console. Takes precedence over
    /// client credentials when set.
    pub developer_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// JSON app-settings file supplying the client id and secret.
    pub credentials_file: Option<PathBuf>,
    pub subject_type: SubjectType,
    pub subject_id: Option<String>,
    /// Children requested per listing page.
    pub page_size: u32,
}

/// [migration] section - which folders to migrate.
#[derive(Debug, Clone, Default)]
pub struct MigrationConfig {
    pub origin_folder_id: Option<String>,
    pub accounts_folder_id: Option<String>,
    pub mapping_file: Option<PathBuf>,
}

/// [log] section - where the migration log is written.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub directory: PathBuf,
    pub base_name: String,
}

// =============================================================================
// Top-level Config
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub box_api: BoxApiConfig,
    pub migration: MigrationConfig,
    pub log: LogConfig,
}
