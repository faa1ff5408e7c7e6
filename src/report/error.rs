use std::path::PathBuf;

use crate::remote::RemoteError;

/// Error type for writing CSV reports.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush report: {0}")]
    Flush(#[from] std::io::Error),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
