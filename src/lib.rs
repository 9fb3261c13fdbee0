//! Metart-Mirror: incremental mirror of gallery-site content APIs
//!
//! This crate crawls the paginated content API shared by a family of
//! media-gallery sites and mirrors galleries, movies, models and the
//! model/gallery relation into a SQL store with idempotent replace-writes.

pub mod cli;
pub mod config;
pub mod crawler;
pub mod source;
pub mod storage;

use thiserror::Error;

/// Main error type for ingestion operations
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url} after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Missing field `{field}` in {context}")]
    MissingField { field: String, context: String },

    #[error("Invalid value for `{field}`: {message}")]
    InvalidField { field: String, message: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("MySQL error: {0}")]
    MySql(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    pub(crate) fn missing(field: &str, context: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Credentials-file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read credentials file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub use config::Credentials;
pub use crawler::{Engine, GalleryCatalog, IngestStats, ModelCatalog};
pub use source::{Kind, SourceClient};
pub use storage::{
    MySqlStore, PerCallProvider, RowStore, SharedConnectionProvider, SqliteStore, Writer,
};
