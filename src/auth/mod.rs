//! Service-account authorization for the Sheets and Drive APIs
//!
//! A `SheetSession` is built once at startup from the key file and handed to
//! the gateway. It is never refreshed: a session covers one data-entry run,
//! well inside the token lifetime.

mod credentials;
mod token;

use crate::error::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::path::Path;

pub use credentials::ServiceAccountKey;
pub use token::{build_assertion, AccessToken, Claims};

/// Scopes requested for the spreadsheet and for title lookup on Drive
pub const SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/drive",
];

/// Authorized, immutable session
#[derive(Debug, Clone)]
pub struct SheetSession {
    access_token: String,
    pub client_email: String,
    pub expires_at: DateTime<Utc>,
}

impl SheetSession {
    /// Authorize with a service-account key file
    pub async fn authorize(client: &Client, credentials_path: &Path) -> Result<Self> {
        let key = ServiceAccountKey::from_file(credentials_path)?;
        Self::authorize_key(client, &key).await
    }

    pub async fn authorize_key(client: &Client, key: &ServiceAccountKey) -> Result<Self> {
        let assertion = build_assertion(key, &SCOPES, Utc::now())?;
        let token = token::exchange(client, key, &assertion).await?;

        tracing::info!(
            "Authorized as {} until {}",
            key.client_email,
            token.expires_at.format("%H:%M:%S UTC")
        );

        Ok(Self {
            access_token: token.token,
            client_email: key.client_email.clone(),
            expires_at: token.expires_at,
        })
    }

    /// Session with a token obtained elsewhere
    pub fn from_token(
        access_token: impl Into<String>,
        client_email: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            client_email: client_email.into(),
            expires_at,
        }
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}
