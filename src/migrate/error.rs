//! Error types for migration operations.

use std::path::PathBuf;

use crate::migrate::result::MigrationResult;
use crate::remote::RemoteError;
use crate::report::ReportError;

/// Error type for migration operations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The provider failed a listing or metadata request.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// The migration log could not be written.
    #[error("log error: {0}")]
    Report(#[from] ReportError),

    /// The folder mapping file could not be used.
    #[error("mapping file error: {0}")]
    Mapping(#[from] MappingError),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

/// A migration unit that stopped early.
///
/// `result` holds the outcomes recorded before the failure; copies already
/// made are in it and must still be logged.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct UnitError {
    pub result: MigrationResult,
    #[source]
    pub source: MigrateError,
}

/// Error type for reading a folder mapping file.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("failed to open mapping file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse mapping file: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: expected at least 3 columns, found {found}")]
    MissingColumns { line: u64, found: usize },

    #[error("line {line}: origin folder id is blank")]
    MissingOriginId { line: u64 },
}
