//! API key providers. A run asks for the key once, before any fetch.

use std::env;

use crate::config::API_KEY_ENV;
use crate::error::{HarvestError, Result};

/// Supplies the bearer token sent with every request.
pub trait CredentialProvider {
    fn api_key(&self) -> Result<String>;
}

/// Reads the key from an environment variable (`RIOT_API_KEY` by default).
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Result<String> {
        match env::var(&self.var) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            Ok(_) => Err(HarvestError::Credentials(format!("{} is empty", self.var))),
            Err(e) => Err(HarvestError::Credentials(format!("{}: {}", self.var, e))),
        }
    }
}

/// A key known up front.
#[derive(Clone)]
pub struct StaticCredentials(String);

impl StaticCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Result<String> {
        if self.0.trim().is_empty() {
            return Err(HarvestError::Credentials("API key is empty".into()));
        }
        Ok(self.0.clone())
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticCredentials(<redacted>)")
    }
}
