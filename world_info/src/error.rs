//! Error types for the activation engine.

use thiserror::Error;

/// Failure reported by a [`TokenCounter`](crate::TokenCounter).
#[derive(Debug, Clone, Error)]
pub enum TokenizerError {
    #[error("Tokenizer unavailable: {0}")]
    Unavailable(String),

    #[error("Tokenization failed: {0}")]
    Failed(String),
}

/// Errors from [`WorldInfoProcessor::process`](crate::WorldInfoProcessor::process).
#[derive(Debug, Error)]
pub enum WorldInfoError {
    #[error("Token counting failed: {0}")]
    Tokenizer(#[from] TokenizerError),
}

/// Result type alias using [`WorldInfoError`].
pub type Result<T> = std::result::Result<T, WorldInfoError>;
