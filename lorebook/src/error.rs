//! Errors raised while loading books and settings.

use thiserror::Error;

/// Errors from the lorebook data layer.
#[derive(Debug, Error)]
pub enum LoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using [`LoreError`].
pub type Result<T> = std::result::Result<T, LoreError>;
