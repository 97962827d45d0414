// src/error.rs

//! Unified error handling for the watcher.
//!
//! The pipeline taxonomy (`Fetch`, `Parse`, `Store`, `Notify`, `Auth`) is what
//! the run orchestrator reports and records; the remaining variants cover
//! configuration and local I/O.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Listing request failed or came back empty
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Expected listing structure was not found
    #[error("Parse error: {0}")]
    Parse(String),

    /// Record or error table read/write failed
    #[error("Store error: {0}")]
    Store(String),

    /// Mail transport, authentication or pre-send verification failed
    #[error("Notify error: {0}")]
    Notify(String),

    /// Credential or client acquisition failed
    #[error("Auth error: {0}")]
    Auth(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error.
    pub fn fetch(message: impl fmt::Display) -> Self {
        Self::Fetch(message.to_string())
    }

    /// Create a parse error.
    pub fn parse(message: impl fmt::Display) -> Self {
        Self::Parse(message.to_string())
    }

    /// Create a parse error for a CSS selector that does not compile.
    pub fn selector(selector: &str, message: impl fmt::Display) -> Self {
        Self::Parse(format!("invalid selector '{selector}': {message}"))
    }

    /// Create a store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }

    /// Create a notify error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    /// Create an auth error.
    pub fn auth(message: impl fmt::Display) -> Self {
        Self::Auth(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_message() {
        let err = AppError::fetch("connection refused");
        assert_eq!(err.to_string(), "Fetch error: connection refused");
    }

    #[test]
    fn test_selector_is_parse_error() {
        let err = AppError::selector("[[", "unexpected token");
        assert!(matches!(err, AppError::Parse(_)));
        assert!(err.to_string().contains("[["));
    }
}
