//! Access tokens for the Box API.
//!
//! A [`TokenProvider`] hands out bearer tokens. Two providers exist: a fixed
//! developer token, and the OAuth2 client-credentials grant, which keeps the
//! current token until shortly before it expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::remote::error::{RemoteError, Result};

/// Tokens are refreshed this long before the provider says they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for API requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token that is valid right now.
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token, such as a developer token from the app console.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Who the client-credentials grant acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// The enterprise's service account, by enterprise id.
    Enterprise(String),
    /// A managed user, by user id.
    User(String),
}

impl Subject {
    fn subject_type(&self) -> &'static str {
        match self {
            Subject::Enterprise(_) => "enterprise",
            Subject::User(_) => "user",
        }
    }

    fn subject_id(&self) -> &str {
        match self {
            Subject::Enterprise(id) | Subject::User(id) => id,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// OAuth2 client-credentials grant against the provider's token endpoint.
pub struct ClientCredentials {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    subject: Subject,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentials {
    pub fn new(
        http: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        subject: Subject,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            subject,
            cached: Mutex::new(None),
        }
    }

    async fn request_token(&self) -> Result<CachedToken> {
        debug!(
            subject_type = self.subject.subject_type(),
            subject_id = self.subject.subject_id(),
            "requesting access token"
        );

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("box_subject_type", self.subject.subject_type()),
                ("box_subject_id", self.subject.subject_id()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_token_error(status.as_u16(), &body));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteError::InvalidResponse(format!("token response: {}", e)))?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(0));

        Ok(CachedToken {
            access_token: token.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(REFRESH_MARGIN),
        })
    }
}

#[async_trait]
impl TokenProvider for ClientCredentials {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}

/// Turn a failed token response into an `Auth` error.
fn parse_token_error(status: u16, body: &str) -> RemoteError {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) => match err.error_description {
            Some(description) => RemoteError::Auth(format!("{}: {}", err.error, description)),
            None => RemoteError::Auth(err.error),
        },
        Err(_) => RemoteError::Auth(format!("token endpoint returned status {}", status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticToken::new("dev-token");
        assert_eq!(provider.access_token().await.unwrap(), "dev-token");
    }

    #[test]
    fn test_subject_form_values() {
        let subject = Subject::User("3668833979".to_string());
        assert_eq!(subject.subject_type(), "user");
        assert_eq!(subject.subject_id(), "3668833979");

        let subject = Subject::Enterprise("42".to_string());
        assert_eq!(subject.subject_type(), "enterprise");
        assert_eq!(subject.subject_id(), "42");
    }

    #[test]
    fn test_parse_token_error_with_description() {
        let err = parse_token_error(
            400,
            r#"{"error":"invalid_client","error_description":"The client credentials are invalid"}"#,
        );
        match err {
            RemoteError::Auth(msg) => {
                assert_eq!(msg, "invalid_client: The client credentials are invalid")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_token_error_unparseable_body() {
        let err = parse_token_error(502, "<html>bad gateway</html>");
        match err {
            RemoteError::Auth(msg) => assert!(msg.contains("502")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
