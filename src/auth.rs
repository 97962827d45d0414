// src/auth.rs

//! Credential lookup for the store and the mail transport.
//!
//! Secrets never live in the config file; the config only names the
//! environment variables (or token file) to read them from. Every lookup goes
//! back to the source, so a caller that needs fresh credentials simply asks
//! again.

use std::collections::HashMap;

use lettre::transport::smtp::authentication::Credentials;

use crate::error::{AppError, Result};
use crate::models::{MailConfig, StoreConfig};

/// Where named secrets come from.
pub trait SecretSource: Send + Sync {
    /// Look up a secret; empty values count as missing.
    fn get(&self, name: &str) -> Option<String>;
}

/// Secrets from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretSource for EnvSecrets {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

impl SecretSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

/// Bearer token for the spreadsheet API.
///
/// The variable named by `token_env` wins; `token_file` is the fallback.
pub async fn sheets_token(store: &StoreConfig, secrets: &dyn SecretSource) -> Result<String> {
    if let Some(token) = secrets.get(&store.token_env) {
        return Ok(token.trim().to_string());
    }

    if let Some(path) = &store.token_file {
        let token = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::auth(format!("cannot read token file {path:?}: {e}")))?;
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::auth(format!("token file {path:?} is empty")));
        }
        return Ok(token.to_string());
    }

    Err(AppError::auth(format!(
        "no spreadsheet token: set {} or store.token_file",
        store.token_env
    )))
}

/// SMTP login for the mail transport.
pub fn smtp_credentials(mail: &MailConfig, secrets: &dyn SecretSource) -> Result<Credentials> {
    let username = secrets
        .get(&mail.username_env)
        .ok_or_else(|| AppError::auth(format!("{} is not set", mail.username_env)))?;
    let password = secrets
        .get(&mail.password_env)
        .ok_or_else(|| AppError::auth(format!("{} is not set", mail.password_env)))?;
    Ok(Credentials::new(username, password))
}
