use thiserror::Error;

/// HTTP status the provider uses for a missing item.
pub const STATUS_NOT_FOUND: u16 = 404;

/// HTTP status the provider uses when a name is already taken in a folder.
pub const STATUS_CONFLICT: u16 = 409;

/// Error type for remote directory operations.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The provider rejected the request and returned a diagnostic payload.
    #[error("{message} (status {status}, code {code})")]
    Api {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// No usable access token could be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure talking to the provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with something we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A custom error message.
    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    /// Build an `Api` error for a missing item.
    pub fn not_found(message: impl Into<String>) -> Self {
        RemoteError::Api {
            status: STATUS_NOT_FOUND,
            code: "not_found".to_string(),
            message: message.into(),
            request_id: None,
        }
    }

    /// True if the provider reported the item as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Api { status, .. } if *status == STATUS_NOT_FOUND)
    }

    /// True if the provider reported a name collision in the target folder.
    pub fn is_name_conflict(&self) -> bool {
        matches!(self, RemoteError::Api { status, .. } if *status == STATUS_CONFLICT)
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;
