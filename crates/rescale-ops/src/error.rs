//! Error types for stage construction.
//!
//! Streaming errors (`copy_pixels`) use [`rescale_core::Error`] so they pass
//! unchanged through stacked stages. Errors detected while *building* a
//! stage, before any row is processed, use [`OpsError`].

use thiserror::Error;

/// Error type for stage construction and configuration.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operation not supported for this format.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Error reported by a core type.
    #[error(transparent)]
    Core(#[from] rescale_core::Error),

    /// Settings document could not be parsed.
    #[error("YAML parse error: {0}")]
    Config(#[from] serde_yaml::Error),
}

/// Result type for stage construction.
pub type OpsResult<T> = Result<T, OpsError>;
