//! Service-account key file

use crate::error::{AppError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Fields of a Google service-account JSON key used for token exchange
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Read and check a key file
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(data)?;

        if key.key_type != "service_account" {
            return Err(AppError::Auth(format!(
                "Expected a service_account key, got '{}'",
                key.key_type
            )));
        }
        if key.client_email.is_empty() {
            return Err(AppError::Auth("Key has no client_email".to_string()));
        }
        if !key.private_key.contains("PRIVATE KEY") {
            return Err(AppError::Auth("Key has no PEM private key".to_string()));
        }

        Ok(key)
    }
}
