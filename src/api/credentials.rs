use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to read token file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse token: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Token has expired")]
    TokenExpired,
    #[error("No access token available")]
    Missing,
}

/// Source of the bearer token attached to every backend call.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Result<String, CredentialError>;
}

/// A token handed over directly, e.g. from `FMC_API_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Result<String, CredentialError> {
        if self.0.trim().is_empty() {
            return Err(CredentialError::Missing);
        }
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredToken {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn new(token: String) -> Self {
        Self {
            token,
            expires_at: None,
        }
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at.is_none_or(|at| at > Utc::now())
    }
}

/// Token persisted by the login flow as a small JSON document.
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn save_token(&self, token: &StoredToken) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(token)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn load_token(&self) -> Result<StoredToken, CredentialError> {
        let content = std::fs::read_to_string(&self.path)?;
        let token: StoredToken = serde_json::from_str(&content)?;
        Ok(token)
    }
}

impl CredentialProvider for TokenFile {
    fn bearer_token(&self) -> Result<String, CredentialError> {
        let stored = self.load_token()?;
        if stored.token.is_empty() {
            return Err(CredentialError::Missing);
        }
        if !stored.is_valid() {
            tracing::warn!("Stored token at {} has expired", self.path.display());
            return Err(CredentialError::TokenExpired);
        }
        Ok(stored.token)
    }
}
