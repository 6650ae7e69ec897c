//! # Error Types
//!
//! One error enum per external collaborator. Interaction handlers catch
//! [`StoreError`] and [`DirectoryError`] at the interaction boundary and turn
//! them into a plain retry message; [`ConfigError`] is fatal at startup.

use thiserror::Error;

/// Persistence failures from the notification store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query or connection failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Failures talking to the restaurant directory API.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Transport failure, timeout or undecodable body
    #[error("directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("directory returned HTTP {0}")]
    Status(u16),

    /// The venue lookup returned no result for the slug
    #[error("venue not found: {0}")]
    NotFound(String),

    /// The response did not have the expected shape
    #[error("malformed directory response: {0}")]
    Parse(String),
}

/// Failures from the chat transport.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Telegram Bot API request failure
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Failure reported by a non-Telegram gateway
    #[error("chat transport failed: {0}")]
    Transport(String),
}

/// Startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is absent or blank
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is present but cannot be used
    #[error("Invalid {var}: {value}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },
}
